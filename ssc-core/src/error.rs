//! sscrypto errors.

use core::array::TryFromSliceError;

use crate::stream::SessionState;

#[cfg(feature = "stream")]
use futures::io::Error as FuturesIOError;

/// An sscrypto error.
#[derive(Debug)]
pub enum Error {
    /// Malformed key, malformed or too short message, or an unsupported parameter.
    InvalidArgument(String),
    /// The authentication tag did not match: the message was tampered with or the key is wrong.
    InvalidHmac,
    /// The ciphertext did not decrypt to a well-formed plaintext.
    InvalidCipherText,
    /// The stream was explicitly canceled.
    StreamCanceled,
    /// Input was offered to a stream session that already reached a terminal state.
    StreamClosed(SessionState),
    /// The CRC32 prefix of an asymmetrically encrypted message did not match.
    InvalidCrc,
    /// An asymmetric key could not be parsed or generated.
    InvalidKey(String),
    /// Opaque symmetric primitive error.
    Symmetric,
    /// Opaque asynchronous IO error from the futures crate.
    #[cfg(feature = "stream")]
    FuturesIO(FuturesIOError),
}

impl Error {
    /// Returns `true` for errors that signal tampering or a wrong key.
    ///
    /// Callers that alert on tampering should branch on this, not on argument errors.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::InvalidHmac | Self::InvalidCrc)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidArgument(s) => write!(f, "INVALID_ARG: {s}"),
            Self::InvalidHmac => write!(f, "INVALID_HMAC: authentication tag mismatch"),
            Self::InvalidCipherText => write!(f, "INVALID_CIPHER_TEXT: malformed plaintext padding"),
            Self::StreamCanceled => write!(f, "STREAM_CANCELED"),
            Self::StreamClosed(state) => write!(f, "stream no longer accepts input: {state:?}"),
            Self::InvalidCrc => write!(f, "INVALID_CRC32"),
            Self::InvalidKey(s) => write!(f, "INVALID_KEY: {s}"),
            Self::Symmetric => write!(f, "symmetric encryption operation error"),
            #[cfg(feature = "stream")]
            Self::FuturesIO(e) => write!(f, "futures IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "stream")]
            Self::FuturesIO(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TryFromSliceError> for Error {
    fn from(_: TryFromSliceError) -> Self {
        Self::InvalidArgument("slice has the wrong length".to_string())
    }
}

impl From<base64ct::Error> for Error {
    fn from(e: base64ct::Error) -> Self {
        Self::InvalidArgument(format!("invalid base64: {e}"))
    }
}

#[cfg(feature = "stream")]
impl From<FuturesIOError> for Error {
    fn from(e: FuturesIOError) -> Self {
        Self::FuturesIO(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_error_codes() {
        assert!(Error::InvalidArgument("size 42".into())
            .to_string()
            .contains("INVALID_ARG"));
        assert!(Error::InvalidHmac.to_string().contains("INVALID_HMAC"));
        assert!(Error::StreamCanceled.to_string().contains("STREAM_CANCELED"));
        assert!(Error::InvalidCrc.to_string().contains("INVALID_CRC32"));
    }

    #[test]
    fn test_integrity_failures_are_distinct() {
        assert!(Error::InvalidHmac.is_integrity_failure());
        assert!(Error::InvalidCrc.is_integrity_failure());
        assert!(!Error::InvalidArgument(String::new()).is_integrity_failure());
        assert!(!Error::StreamCanceled.is_integrity_failure());
    }
}
