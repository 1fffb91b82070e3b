//! Backend built on [ring](https://docs.rs/ring) for HMAC, hashing and randomness and on the
//! RustCrypto [`cbc`](https://docs.rs/cbc) mode for the block cipher.
//!
//! ring does not offer AES-CBC, hence the split.

use super::{Backend, BackendKind, CbcMode, MacState};
use crate::consts::*;
use crate::error::Error;

use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use core::fmt;
use ring::rand::{SecureRandom, SystemRandom};
use ring::{digest, hmac};

/// The native backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Native;

impl super::sealed::Backend for Native {}

/// CBC encryption context of the [`Native`] backend.
pub enum NativeEncryptor {
    #[doc(hidden)]
    Aes128(cbc::Encryptor<Aes128>),
    #[doc(hidden)]
    Aes192(cbc::Encryptor<Aes192>),
    #[doc(hidden)]
    Aes256(cbc::Encryptor<Aes256>),
}

/// CBC decryption context of the [`Native`] backend.
pub enum NativeDecryptor {
    #[doc(hidden)]
    Aes128(cbc::Decryptor<Aes128>),
    #[doc(hidden)]
    Aes192(cbc::Decryptor<Aes192>),
    #[doc(hidden)]
    Aes256(cbc::Decryptor<Aes256>),
}

/// HMAC-SHA256 accumulator of the [`Native`] backend.
pub struct NativeMac(hmac::Context);

impl From<ring::error::Unspecified> for Error {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::Symmetric
    }
}

impl fmt::Debug for NativeEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeEncryptor").finish_non_exhaustive()
    }
}

impl fmt::Debug for NativeDecryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeDecryptor").finish_non_exhaustive()
    }
}

impl fmt::Debug for NativeMac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeMac").finish_non_exhaustive()
    }
}

impl CbcMode for NativeEncryptor {
    fn process_blocks(&mut self, blocks: &mut [u8]) {
        debug_assert_eq!(blocks.len() % BLOCK_SIZE, 0);

        for block in blocks.chunks_exact_mut(BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(block);
            match self {
                Self::Aes128(c) => c.encrypt_block_mut(block),
                Self::Aes192(c) => c.encrypt_block_mut(block),
                Self::Aes256(c) => c.encrypt_block_mut(block),
            }
        }
    }
}

impl CbcMode for NativeDecryptor {
    fn process_blocks(&mut self, blocks: &mut [u8]) {
        debug_assert_eq!(blocks.len() % BLOCK_SIZE, 0);

        for block in blocks.chunks_exact_mut(BLOCK_SIZE) {
            let block = GenericArray::from_mut_slice(block);
            match self {
                Self::Aes128(c) => c.decrypt_block_mut(block),
                Self::Aes192(c) => c.decrypt_block_mut(block),
                Self::Aes256(c) => c.decrypt_block_mut(block),
            }
        }
    }
}

impl MacState for NativeMac {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self) -> [u8; TAG_SIZE] {
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(self.0.sign().as_ref());
        tag
    }
}

impl Backend for Native {
    const KIND: BackendKind = BackendKind::Native;

    type Encryptor = NativeEncryptor;
    type Decryptor = NativeDecryptor;
    type Mac = NativeMac;

    fn encryptor(key: &[u8], iv: &[u8; IV_SIZE]) -> Result<Self::Encryptor, Error> {
        Ok(match key.len() {
            16 => NativeEncryptor::Aes128(cbc::Encryptor::new_from_slices(key, iv)?),
            24 => NativeEncryptor::Aes192(cbc::Encryptor::new_from_slices(key, iv)?),
            32 => NativeEncryptor::Aes256(cbc::Encryptor::new_from_slices(key, iv)?),
            _ => return Err(Error::Symmetric),
        })
    }

    fn decryptor(key: &[u8], iv: &[u8; IV_SIZE]) -> Result<Self::Decryptor, Error> {
        Ok(match key.len() {
            16 => NativeDecryptor::Aes128(cbc::Decryptor::new_from_slices(key, iv)?),
            24 => NativeDecryptor::Aes192(cbc::Decryptor::new_from_slices(key, iv)?),
            32 => NativeDecryptor::Aes256(cbc::Decryptor::new_from_slices(key, iv)?),
            _ => return Err(Error::Symmetric),
        })
    }

    fn mac(key: &[u8]) -> Result<Self::Mac, Error> {
        let key = hmac::Key::new(hmac::HMAC_SHA256, key);
        Ok(NativeMac(hmac::Context::with_key(&key)))
    }

    fn sha256(data: &[u8]) -> [u8; HASH_SIZE] {
        let mut out = [0u8; HASH_SIZE];
        out.copy_from_slice(digest::digest(&digest::SHA256, data).as_ref());
        out
    }

    fn fill_random(buf: &mut [u8]) -> Result<(), Error> {
        SystemRandom::new().fill(buf)?;
        Ok(())
    }

    // The cbc crate brings its own PKCS#7 handling for whole messages.
    fn encrypt_cbc(key: &[u8], iv: &[u8; IV_SIZE], plain: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(match key.len() {
            16 => cbc::Encryptor::<Aes128>::new_from_slices(key, iv)?
                .encrypt_padded_vec_mut::<Pkcs7>(plain),
            24 => cbc::Encryptor::<Aes192>::new_from_slices(key, iv)?
                .encrypt_padded_vec_mut::<Pkcs7>(plain),
            32 => cbc::Encryptor::<Aes256>::new_from_slices(key, iv)?
                .encrypt_padded_vec_mut::<Pkcs7>(plain),
            _ => return Err(Error::Symmetric),
        })
    }

    fn decrypt_cbc(key: &[u8], iv: &[u8; IV_SIZE], ct: &[u8]) -> Result<Vec<u8>, Error> {
        let res = match key.len() {
            16 => cbc::Decryptor::<Aes128>::new_from_slices(key, iv)?
                .decrypt_padded_vec_mut::<Pkcs7>(ct),
            24 => cbc::Decryptor::<Aes192>::new_from_slices(key, iv)?
                .decrypt_padded_vec_mut::<Pkcs7>(ct),
            32 => cbc::Decryptor::<Aes256>::new_from_slices(key, iv)?
                .decrypt_padded_vec_mut::<Pkcs7>(ct),
            _ => return Err(Error::Symmetric),
        };

        res.map_err(|_| Error::InvalidCipherText)
    }
}
