//! Symmetric key material.

use crate::backend::{Backend, DefaultBackend};
use crate::error::Error;

use base64ct::{Base64, Encoding};
use core::fmt;
use core::marker::PhantomData;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Supported AES key sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeySize {
    /// AES-128.
    Aes128,
    /// AES-192.
    Aes192,
    /// AES-256.
    #[default]
    Aes256,
}

impl KeySize {
    /// The size in bits.
    pub fn bits(&self) -> u16 {
        match self {
            Self::Aes128 => 128,
            Self::Aes192 => 192,
            Self::Aes256 => 256,
        }
    }

    /// The length in bytes of each of the two sub-keys.
    pub fn sub_key_len(&self) -> usize {
        usize::from(self.bits() / 8)
    }

    /// The length in bytes of the raw key material, both sub-keys together.
    pub fn raw_len(&self) -> usize {
        2 * self.sub_key_len()
    }

    /// Infers the key size from the length of a raw key buffer.
    pub fn from_raw_len(len: usize) -> Result<Self, Error> {
        match len {
            32 => Ok(Self::Aes128),
            48 => Ok(Self::Aes192),
            64 => Ok(Self::Aes256),
            _ => Err(Error::InvalidArgument(format!(
                "raw key of {len} bytes, expected 32, 48 or 64"
            ))),
        }
    }
}

impl TryFrom<u16> for KeySize {
    type Error = Error;

    fn try_from(bits: u16) -> Result<Self, Self::Error> {
        match bits {
            128 => Ok(Self::Aes128),
            192 => Ok(Self::Aes192),
            256 => Ok(Self::Aes256),
            _ => Err(Error::InvalidArgument(format!(
                "key size of {bits} bits, expected 128, 192 or 256"
            ))),
        }
    }
}

/// A symmetric key, consisting of an AES key and an independent HMAC key.
///
/// The raw key material is the concatenation `cipher key || hmac key`, both halves having the
/// length of the AES key. The key is immutable and cheap to clone: clones share the same
/// material, which is released when the last clone (or stream session) is dropped.
///
/// The backend `B` is fixed at construction and performs every operation with this key.
pub struct SymKey<B: Backend = DefaultBackend> {
    size: KeySize,
    raw: Arc<[u8]>,
    _backend: PhantomData<B>,
}

impl<B: Backend> SymKey<B> {
    /// Generates a fresh random key.
    pub fn generate(size: KeySize) -> Result<Self, Error> {
        let mut raw = vec![0u8; size.raw_len()];

        // The two halves must never coincide.
        loop {
            B::fill_random(&mut raw)?;
            if !halves_equal(&raw) {
                break;
            }
        }

        log::debug!("generated {}-bit key using the {} backend", size.bits(), B::KIND);

        Ok(Self::from_raw(size, raw))
    }

    /// Generates a fresh random key of `bits` bits.
    ///
    /// Fails with [`Error::InvalidArgument`] for sizes other than 128, 192 or 256.
    pub fn generate_bits(bits: u16) -> Result<Self, Error> {
        Self::generate(KeySize::try_from(bits)?)
    }

    /// Imports raw key material of 32, 48 or 64 bytes.
    pub fn from_bytes(raw: impl AsRef<[u8]>) -> Result<Self, Error> {
        let raw = raw.as_ref();
        let size = KeySize::from_raw_len(raw.len())?;

        if halves_equal(raw) {
            return Err(Error::InvalidArgument(
                "cipher key and hmac key must differ".to_string(),
            ));
        }

        Ok(Self::from_raw(size, raw.to_vec()))
    }

    /// Imports a key from the base64 encoding of its raw material.
    pub fn from_b64(b64: &str) -> Result<Self, Error> {
        Self::from_bytes(Base64::decode_vec(b64.trim())?)
    }

    /// Exports the raw key material as base64.
    pub fn to_b64(&self) -> String {
        Base64::encode_string(&self.raw)
    }

    /// Exports the raw key material.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.raw.to_vec()
    }

    /// The AES key size.
    pub fn size(&self) -> KeySize {
        self.size
    }

    /// Reinterprets the same key material for use with another backend.
    pub fn with_backend<B2: Backend>(&self) -> SymKey<B2> {
        SymKey {
            size: self.size,
            raw: Arc::clone(&self.raw),
            _backend: PhantomData,
        }
    }

    pub(crate) fn cipher_key(&self) -> &[u8] {
        &self.raw[..self.size.sub_key_len()]
    }

    pub(crate) fn hmac_key(&self) -> &[u8] {
        &self.raw[self.size.sub_key_len()..]
    }

    fn from_raw(size: KeySize, raw: Vec<u8>) -> Self {
        Self {
            size,
            raw: raw.into(),
            _backend: PhantomData,
        }
    }
}

fn halves_equal(raw: &[u8]) -> bool {
    let (a, b) = raw.split_at(raw.len() / 2);
    a.ct_eq(b).into()
}

impl<B: Backend> Clone for SymKey<B> {
    fn clone(&self) -> Self {
        Self {
            size: self.size,
            raw: Arc::clone(&self.raw),
            _backend: PhantomData,
        }
    }
}

impl<B: Backend> PartialEq for SymKey<B> {
    fn eq(&self, other: &Self) -> bool {
        self.raw.len() == other.raw.len() && bool::from(self.raw.ct_eq(&other.raw))
    }
}

impl<B: Backend> Eq for SymKey<B> {}

// Never print key material.
impl<B: Backend> fmt::Debug for SymKey<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymKey")
            .field("size", &self.size)
            .field("backend", &B::KIND)
            .finish_non_exhaustive()
    }
}

impl<B: Backend> core::str::FromStr for SymKey<B> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_b64(s)
    }
}

#[cfg(feature = "serde")]
impl<B: Backend> serde::Serialize for SymKey<B> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_b64())
    }
}

#[cfg(feature = "serde")]
impl<'de, B: Backend> serde::Deserialize<'de> for SymKey<B> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        Self::from_b64(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_all_sizes<B: Backend>() {
        for size in [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256] {
            let key = SymKey::<B>::generate(size).unwrap();
            assert_eq!(key.size(), size);
            assert_eq!(key.to_bytes().len(), size.raw_len());
            assert_eq!(key.cipher_key().len(), size.sub_key_len());
            assert_eq!(key.hmac_key().len(), size.sub_key_len());
            assert_ne!(key.cipher_key(), key.hmac_key());
        }
    }

    fn invalid_sizes<B: Backend>() {
        assert!(matches!(
            SymKey::<B>::generate_bits(42),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            SymKey::<B>::from_bytes(b"zkejglzeigh"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            SymKey::<B>::from_bytes([0u8; 33]),
            Err(Error::InvalidArgument(_))
        ));
    }

    fn equal_halves_rejected<B: Backend>() {
        let mut raw = vec![0x42u8; 64];
        assert!(matches!(
            SymKey::<B>::from_bytes(&raw),
            Err(Error::InvalidArgument(_))
        ));

        raw[63] = 0;
        assert!(SymKey::<B>::from_bytes(&raw).is_ok());
    }

    fn b64_round_trip<B: Backend>() {
        let key = SymKey::<B>::generate(KeySize::Aes256).unwrap();
        let b64 = key.to_b64();
        let imported = SymKey::<B>::from_b64(&b64).unwrap();

        assert_eq!(key, imported);
        assert_eq!(imported.size(), KeySize::Aes256);
        assert_eq!(b64.parse::<SymKey<B>>().unwrap(), key);
    }

    fn b64_wrong_length<B: Backend>() {
        // 16 bytes of key material.
        let b64 = "AAECAwQFBgcICQoLDA0ODw==";
        assert!(matches!(
            SymKey::<B>::from_b64(b64),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            SymKey::<B>::from_b64("not base64 at all!"),
            Err(Error::InvalidArgument(_))
        ));
    }

    fn debug_hides_material<B: Backend>() {
        let key = SymKey::<B>::generate(KeySize::Aes128).unwrap();
        let dbg = format!("{key:?}");
        assert!(!dbg.contains(&key.to_b64()));
        assert!(dbg.contains("Aes128"));
    }

    crate::backend_tests!(
        generate_all_sizes,
        invalid_sizes,
        equal_halves_rejected,
        b64_round_trip,
        b64_wrong_length,
        debug_hides_material,
    );

    #[test]
    fn test_key_size_conversions() {
        for bits in [128u16, 192, 256] {
            let size = KeySize::try_from(bits).unwrap();
            assert_eq!(size.bits(), bits);
            assert_eq!(KeySize::from_raw_len(size.raw_len()).unwrap(), size);
        }

        assert_eq!(KeySize::default(), KeySize::Aes256);
    }

    #[test]
    #[cfg(feature = "serde")]
    fn test_serde_as_b64_string() {
        let key = SymKey::<DefaultBackend>::generate(KeySize::Aes192).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", key.to_b64()));

        let back: SymKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }
}
