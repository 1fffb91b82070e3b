//! RSA key wrapper for exchanging symmetric keys.
//!
//! Encryption uses RSA-OAEP with SHA-1 and MGF1-SHA-1. The plaintext can optionally be prefixed
//! with its big-endian CRC32, which is checked and stripped on decryption. Signatures are
//! RSA-PKCS#1-v1.5 over SHA-256. Keys are (de)serialized as PKCS#1, either DER, base64 DER or
//! PEM.

use crate::consts::CRC_SIZE;
use crate::error::Error;

use base64ct::{Base64, Encoding};
use core::fmt;
use rand::rngs::OsRng;
use rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding,
};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// Modulus sizes accepted by [`PrivateKey::generate`].
pub const RSA_KEY_SIZES: [usize; 3] = [1024, 2048, 4096];

impl From<rsa::pkcs1::Error> for Error {
    fn from(e: rsa::pkcs1::Error) -> Self {
        Self::InvalidKey(e.to_string())
    }
}

fn crc_prefixed(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(CRC_SIZE + data.len());
    out.extend_from_slice(&crc32fast::hash(data).to_be_bytes());
    out.extend_from_slice(data);
    out
}

/// An RSA public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    /// Parses a PKCS#1 DER encoded public key.
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        Ok(Self(RsaPublicKey::from_pkcs1_der(der)?))
    }

    /// Parses a base64 encoded PKCS#1 DER public key.
    pub fn from_b64(b64: &str) -> Result<Self, Error> {
        let der = Base64::decode_vec(b64.trim())
            .map_err(|e| Error::InvalidKey(format!("invalid base64: {e}")))?;
        Self::from_der(&der)
    }

    /// Parses a PKCS#1 PEM public key (`RSA PUBLIC KEY`).
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        Ok(Self(RsaPublicKey::from_pkcs1_pem(pem)?))
    }

    /// Serializes to PKCS#1 DER.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        Ok(self.0.to_pkcs1_der()?.as_bytes().to_vec())
    }

    /// Serializes to base64 PKCS#1 DER.
    pub fn to_b64(&self) -> Result<String, Error> {
        Ok(Base64::encode_string(&self.to_der()?))
    }

    /// Serializes to PKCS#1 PEM.
    pub fn to_pem(&self) -> Result<String, Error> {
        Ok(self.0.to_pkcs1_pem(LineEnding::LF)?)
    }

    /// The modulus size in bits.
    pub fn bits(&self) -> usize {
        self.0.n().bits()
    }

    /// Encrypts `data` for the holder of the private key, optionally prefixed with its CRC32.
    ///
    /// The plaintext, including the CRC32 prefix, must fit a single OAEP block.
    pub fn encrypt(&self, data: &[u8], crc: bool) -> Result<Vec<u8>, Error> {
        let plain = if crc {
            crc_prefixed(data)
        } else {
            data.to_vec()
        };

        self.0
            .encrypt(&mut OsRng, Oaep::new::<Sha1>(), &plain)
            .map_err(|e| Error::InvalidArgument(format!("cannot encrypt: {e}")))
    }

    /// Checks an RSA-PKCS#1-v1.5 SHA-256 signature over `data`.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        let hashed = Sha256::digest(data);
        self.0
            .verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
            .is_ok()
    }

    /// Hex encoded SHA-256 of the base64 DER serialization.
    pub fn fingerprint(&self) -> Result<String, Error> {
        Ok(hex::encode(self.fingerprint_raw()?))
    }

    /// Base64 encoded SHA-256 of the base64 DER serialization.
    pub fn fingerprint_b64(&self) -> Result<String, Error> {
        Ok(Base64::encode_string(&self.fingerprint_raw()?))
    }

    fn fingerprint_raw(&self) -> Result<[u8; 32], Error> {
        Ok(Sha256::digest(self.to_b64()?.as_bytes()).into())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}

/// An RSA private key.
#[derive(Clone)]
pub struct PrivateKey {
    key: RsaPrivateKey,
    public: PublicKey,
}

impl PrivateKey {
    /// Generates a fresh key of 1024, 2048 or 4096 bits.
    pub fn generate(bits: usize) -> Result<Self, Error> {
        if !RSA_KEY_SIZES.contains(&bits) {
            return Err(Error::InvalidArgument(format!(
                "RSA key size of {bits} bits, expected one of {RSA_KEY_SIZES:?}"
            )));
        }

        let key = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| Error::InvalidKey(e.to_string()))?;

        log::debug!("generated {bits}-bit RSA key");

        Ok(Self::from_key(key))
    }

    /// Parses a PKCS#1 DER encoded private key.
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        Ok(Self::from_key(RsaPrivateKey::from_pkcs1_der(der)?))
    }

    /// Parses a base64 encoded PKCS#1 DER private key.
    pub fn from_b64(b64: &str) -> Result<Self, Error> {
        let der = Base64::decode_vec(b64.trim())
            .map_err(|e| Error::InvalidKey(format!("invalid base64: {e}")))?;
        Self::from_der(&der)
    }

    /// Parses a PKCS#1 PEM private key (`RSA PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        Ok(Self::from_key(RsaPrivateKey::from_pkcs1_pem(pem)?))
    }

    /// Serializes to PKCS#1 DER.
    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        Ok(self.key.to_pkcs1_der()?.as_bytes().to_vec())
    }

    /// Serializes to base64 PKCS#1 DER.
    pub fn to_b64(&self) -> Result<String, Error> {
        Ok(Base64::encode_string(&self.to_der()?))
    }

    /// Serializes to PKCS#1 PEM.
    pub fn to_pem(&self) -> Result<String, Error> {
        Ok(self.key.to_pkcs1_pem(LineEnding::LF)?.to_string())
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Decrypts an OAEP ciphertext, checking and stripping the CRC32 prefix if `crc` is set.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidCipherText`] if the OAEP decryption fails,
    /// * [`Error::InvalidCrc`] if the checksum does not match.
    pub fn decrypt(&self, ciphertext: &[u8], crc: bool) -> Result<Vec<u8>, Error> {
        let mut plain = self
            .key
            .decrypt(Oaep::new::<Sha1>(), ciphertext)
            .map_err(|_| Error::InvalidCipherText)?;

        if !crc {
            return Ok(plain);
        }

        if plain.len() < CRC_SIZE {
            return Err(Error::InvalidCrc);
        }

        let message = plain.split_off(CRC_SIZE);
        if plain != crc32fast::hash(&message).to_be_bytes() {
            log::warn!("rejecting RSA plaintext: CRC32 mismatch");
            return Err(Error::InvalidCrc);
        }

        Ok(message)
    }

    /// Signs `data` using RSA-PKCS#1-v1.5 over SHA-256.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let hashed = Sha256::digest(data);
        self.key
            .sign(Pkcs1v15Sign::new::<Sha256>(), &hashed)
            .map_err(|e| Error::InvalidKey(e.to_string()))
    }

    fn from_key(key: RsaPrivateKey) -> Self {
        let public = PublicKey(key.to_public_key());
        Self { key, public }
    }
}

// Never print key material.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}
