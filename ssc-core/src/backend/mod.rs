//! Interchangeable providers of the cryptographic primitives.
//!
//! A [`Backend`] supplies raw AES-CBC block processing, HMAC-SHA256, SHA-256 and random bytes.
//! Two implementations exist and are drop-in compatible:
//!
//! * [`Native`] (feature `"native"`): HMAC, SHA-256 and randomness from
//!   [ring](https://docs.rs/ring), CBC from the RustCrypto [`cbc`](https://docs.rs/cbc) crate.
//! * [`Soft`] (feature `"soft"`): portable software implementation on top of the RustCrypto
//!   [`aes`](https://docs.rs/aes) block cipher with its own CBC chaining,
//!   [`hmac`](https://docs.rs/hmac) and [`sha2`](https://docs.rs/sha2).
//!
//! For identical keys, IVs and plaintexts both backends produce byte-identical ciphertexts. The
//! backend is picked when a key is constructed, either statically through the type parameter of
//! [`SymKey`][`crate::SymKey`] or from configuration through [`BackendKind`].

#[cfg(not(any(feature = "native", feature = "soft")))]
compile_error!("at least one of the features \"native\" or \"soft\" must be enabled");

#[cfg(feature = "native")]
mod native;

#[cfg(feature = "soft")]
mod soft;

#[cfg(feature = "native")]
pub use native::Native;

#[cfg(feature = "soft")]
pub use soft::Soft;

use crate::consts::*;
use crate::error::Error;
use crate::util::{pad_block, unpad};

use core::fmt::Debug;
use core::str::FromStr;

/// The backend used when none is specified.
#[cfg(feature = "native")]
pub type DefaultBackend = Native;

/// The backend used when none is specified.
#[cfg(all(feature = "soft", not(feature = "native")))]
pub type DefaultBackend = Soft;

/// A running AES-CBC context, either encrypting or decrypting.
///
/// The context carries the chaining state from one call to the next, so a message may be
/// processed in any number of block-aligned pieces.
pub trait CbcMode: Send {
    /// Processes `blocks` in place. The length must be a multiple of [`BLOCK_SIZE`].
    fn process_blocks(&mut self, blocks: &mut [u8]);
}

/// A running HMAC-SHA256 accumulator.
pub trait MacState: Send {
    /// Feeds more data into the MAC.
    fn update(&mut self, data: &[u8]);

    /// Computes the tag.
    fn finalize(self) -> [u8; TAG_SIZE];
}

/// The capabilities a backend supplies.
///
/// This trait is sealed, you cannot implement it yourself.
pub trait Backend: sealed::Backend + Debug + Clone + Copy + Send + Sync + 'static {
    /// The configuration name of this backend.
    const KIND: BackendKind;

    /// The CBC encryption context.
    type Encryptor: CbcMode;

    /// The CBC decryption context.
    type Decryptor: CbcMode;

    /// The HMAC-SHA256 accumulator.
    type Mac: MacState;

    /// Starts an AES-CBC encryption under a 16, 24 or 32 byte key.
    fn encryptor(key: &[u8], iv: &[u8; IV_SIZE]) -> Result<Self::Encryptor, Error>;

    /// Starts an AES-CBC decryption under a 16, 24 or 32 byte key.
    fn decryptor(key: &[u8], iv: &[u8; IV_SIZE]) -> Result<Self::Decryptor, Error>;

    /// Starts an HMAC-SHA256 computation.
    fn mac(key: &[u8]) -> Result<Self::Mac, Error>;

    /// Hashes `data` using SHA-256.
    fn sha256(data: &[u8]) -> [u8; HASH_SIZE];

    /// Fills `buf` with cryptographically secure random bytes.
    fn fill_random(buf: &mut [u8]) -> Result<(), Error>;

    /// Encrypts a complete plaintext with AES-CBC and PKCS#7 padding.
    fn encrypt_cbc(key: &[u8], iv: &[u8; IV_SIZE], plain: &[u8]) -> Result<Vec<u8>, Error> {
        let full = plain.len() - plain.len() % BLOCK_SIZE;

        let mut out = Vec::with_capacity(full + BLOCK_SIZE);
        out.extend_from_slice(&plain[..full]);
        out.extend_from_slice(&pad_block(&plain[full..]));

        Self::encryptor(key, iv)?.process_blocks(&mut out);

        Ok(out)
    }

    /// Decrypts a complete AES-CBC ciphertext and strips the PKCS#7 padding.
    fn decrypt_cbc(key: &[u8], iv: &[u8; IV_SIZE], ct: &[u8]) -> Result<Vec<u8>, Error> {
        if ct.is_empty() || ct.len() % BLOCK_SIZE != 0 {
            return Err(Error::InvalidCipherText);
        }

        let mut out = ct.to_vec();
        Self::decryptor(key, iv)?.process_blocks(&mut out);
        unpad(&mut out)?;

        Ok(out)
    }
}

/// Returns `len` random bytes drawn from the backend's CSPRNG.
pub fn random_bytes<B: Backend>(len: usize) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0u8; len];
    B::fill_random(&mut buf)?;

    Ok(buf)
}

/// Runtime name of a backend, for selecting one from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// The [`Native`] backend.
    Native,
    /// The [`Soft`] backend.
    Soft,
}

impl BackendKind {
    /// All backends compiled into this build.
    pub fn available() -> Vec<BackendKind> {
        let mut kinds = Vec::new();
        #[cfg(feature = "native")]
        kinds.push(BackendKind::Native);
        #[cfg(feature = "soft")]
        kinds.push(BackendKind::Soft);
        kinds
    }

    /// The name used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Soft => "soft",
        }
    }
}

impl core::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "native" | "node" => Self::Native,
            "soft" | "software" | "forge" => Self::Soft,
            other => {
                return Err(Error::InvalidArgument(format!("unknown backend: {other}")));
            }
        };

        if !Self::available().contains(&kind) {
            return Err(Error::InvalidArgument(format!(
                "backend {kind} is not compiled into this build"
            )));
        }

        Ok(kind)
    }
}

impl From<aes::cipher::InvalidLength> for Error {
    fn from(_: aes::cipher::InvalidLength) -> Self {
        Self::Symmetric
    }
}

pub(crate) mod sealed {
    pub trait Backend {}
}

#[cfg(test)]
mod tests {
    use super::*;

    // Known SHA-256 digests.
    const KNOWN_HASHES: &[(&str, &str)] = &[
        (
            "test",
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
        ),
        (
            "test2",
            "60303ae22b998861bce3b28f33eec1be758a213c86c93c076dbe9f558c11c752",
        ),
        (
            "testTEST",
            "3a16f0fd02b75b2607d5157a73dab35453dbeb02cdca2d50b73392503e56c6dc",
        ),
    ];

    // FIPS 197 / SP 800-38A F.2.5, CBC-AES256.Encrypt, first two blocks.
    const SP800_KEY: &str = "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4";
    const SP800_IV: &str = "000102030405060708090a0b0c0d0e0f";
    const SP800_PLAIN: &str = "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51";
    const SP800_CIPHER: &str = "f58c4c04d6e5f1ba779eabfb5f7bfbd69cfc4e967edb808d679f777bc6702c7d";

    fn unhex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn sha256_known_answers<B: Backend>() {
        for (input, expected) in KNOWN_HASHES {
            assert_eq!(B::sha256(input.as_bytes()).to_vec(), unhex(expected));
        }
    }

    fn random_bytes_lengths<B: Backend>() {
        for len in 0..1000 {
            let a = random_bytes::<B>(len).unwrap();
            let b = random_bytes::<B>(len).unwrap();
            assert_eq!(a.len(), len);
            assert_eq!(b.len(), len);
            if len >= 16 {
                assert_ne!(a, b);
            }
        }
    }

    fn cbc_known_answer<B: Backend>() {
        let key = unhex(SP800_KEY);
        let iv: [u8; IV_SIZE] = unhex(SP800_IV).try_into().unwrap();

        let mut buf = unhex(SP800_PLAIN);
        B::encryptor(&key, &iv).unwrap().process_blocks(&mut buf);
        assert_eq!(buf, unhex(SP800_CIPHER));

        B::decryptor(&key, &iv).unwrap().process_blocks(&mut buf);
        assert_eq!(buf, unhex(SP800_PLAIN));
    }

    fn cbc_chaining_is_split_independent<B: Backend>() {
        let key = random_bytes::<B>(24).unwrap();
        let iv: [u8; IV_SIZE] = random_bytes::<B>(IV_SIZE).unwrap().try_into().unwrap();
        let plain = random_bytes::<B>(BLOCK_SIZE * 7).unwrap();

        let mut whole = plain.clone();
        B::encryptor(&key, &iv).unwrap().process_blocks(&mut whole);

        let mut pieces = plain.clone();
        let mut enc = B::encryptor(&key, &iv).unwrap();
        for piece in pieces.chunks_mut(BLOCK_SIZE * 2) {
            enc.process_blocks(piece);
        }

        assert_eq!(whole, pieces);
    }

    fn one_shot_cbc_round_trip<B: Backend>() {
        let key = random_bytes::<B>(16).unwrap();
        let iv = [7u8; IV_SIZE];

        for len in [0, 1, 15, 16, 17, 100] {
            let plain = random_bytes::<B>(len).unwrap();
            let ct = B::encrypt_cbc(&key, &iv, &plain).unwrap();
            assert_eq!(ct.len(), (len / BLOCK_SIZE + 1) * BLOCK_SIZE);
            assert_eq!(B::decrypt_cbc(&key, &iv, &ct).unwrap(), plain);
        }
    }

    fn rejects_bad_key_lengths<B: Backend>() {
        let iv = [0u8; IV_SIZE];
        assert!(B::encryptor(&[0u8; 20], &iv).is_err());
        assert!(B::decryptor(&[0u8; 33], &iv).is_err());
    }

    fn hmac_rfc4231_case_2<B: Backend>() {
        let mut mac = B::mac(b"Jefe").unwrap();
        mac.update(b"what do ya want ");
        mac.update(b"for nothing?");

        assert_eq!(
            mac.finalize().to_vec(),
            unhex("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
        );
    }

    crate::backend_tests!(
        sha256_known_answers,
        random_bytes_lengths,
        cbc_known_answer,
        cbc_chaining_is_split_independent,
        one_shot_cbc_round_trip,
        rejects_bad_key_lengths,
        hmac_rfc4231_case_2,
    );

    #[test]
    fn test_backend_kind_from_str() {
        for kind in BackendKind::available() {
            assert_eq!(kind.as_str().parse::<BackendKind>().unwrap(), kind);
        }
        assert!(matches!(
            "enigma".parse::<BackendKind>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    #[cfg(all(feature = "native", feature = "soft"))]
    fn test_backends_agree() {
        let data = random_bytes::<Native>(1000).unwrap();
        assert_eq!(Native::sha256(&data), Soft::sha256(&data));

        let key = random_bytes::<Soft>(32).unwrap();
        let iv = [9u8; IV_SIZE];
        assert_eq!(
            Native::encrypt_cbc(&key, &iv, &data).unwrap(),
            Soft::encrypt_cbc(&key, &iv, &data).unwrap()
        );

        let mut a = Native::mac(&key).unwrap();
        let mut b = Soft::mac(&key).unwrap();
        a.update(&data);
        b.update(&data);
        assert_eq!(a.finalize(), b.finalize());
    }
}
