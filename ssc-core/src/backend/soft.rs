//! Portable software backend.
//!
//! Only the raw AES block function is taken from the [`aes`](https://docs.rs/aes) crate, the
//! CBC chaining is done here block by block. HMAC and SHA-256 come from
//! [`hmac`](https://docs.rs/hmac) and [`sha2`](https://docs.rs/sha2), randomness from the
//! operating system through [`rand::rngs::OsRng`].

use super::{Backend, BackendKind, CbcMode, MacState};
use crate::consts::*;
use crate::error::Error;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use core::fmt;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// The software backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Soft;

impl super::sealed::Backend for Soft {}

enum BlockCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl BlockCipher {
    fn new(key: &[u8]) -> Result<Self, Error> {
        Ok(match key.len() {
            16 => Self::Aes128(Aes128::new_from_slice(key)?),
            24 => Self::Aes192(Aes192::new_from_slice(key)?),
            32 => Self::Aes256(Aes256::new_from_slice(key)?),
            _ => return Err(Error::Symmetric),
        })
    }

    fn encrypt(&self, block: &mut [u8; BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.encrypt_block(block),
            Self::Aes192(c) => c.encrypt_block(block),
            Self::Aes256(c) => c.encrypt_block(block),
        }
    }

    fn decrypt(&self, block: &mut [u8; BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.decrypt_block(block),
            Self::Aes192(c) => c.decrypt_block(block),
            Self::Aes256(c) => c.decrypt_block(block),
        }
    }
}

fn xor_in_place(dst: &mut [u8; BLOCK_SIZE], src: &[u8; BLOCK_SIZE]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}

/// CBC encryption context of the [`Soft`] backend.
pub struct SoftEncryptor {
    cipher: BlockCipher,
    // The previous ciphertext block, initially the IV.
    prev: [u8; BLOCK_SIZE],
}

/// CBC decryption context of the [`Soft`] backend.
pub struct SoftDecryptor {
    cipher: BlockCipher,
    prev: [u8; BLOCK_SIZE],
}

/// HMAC-SHA256 accumulator of the [`Soft`] backend.
pub struct SoftMac(HmacSha256);

// Contexts hold round keys and chaining state, none of it is printed.
impl fmt::Debug for SoftEncryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftEncryptor").finish_non_exhaustive()
    }
}

impl fmt::Debug for SoftDecryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftDecryptor").finish_non_exhaustive()
    }
}

impl fmt::Debug for SoftMac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftMac").finish_non_exhaustive()
    }
}

impl CbcMode for SoftEncryptor {
    fn process_blocks(&mut self, blocks: &mut [u8]) {
        debug_assert_eq!(blocks.len() % BLOCK_SIZE, 0);

        for chunk in blocks.chunks_exact_mut(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);

            xor_in_place(&mut block, &self.prev);
            self.cipher.encrypt(&mut block);

            chunk.copy_from_slice(&block);
            self.prev = block;
        }
    }
}

impl CbcMode for SoftDecryptor {
    fn process_blocks(&mut self, blocks: &mut [u8]) {
        debug_assert_eq!(blocks.len() % BLOCK_SIZE, 0);

        for chunk in blocks.chunks_exact_mut(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            let ct = block;

            self.cipher.decrypt(&mut block);
            xor_in_place(&mut block, &self.prev);

            chunk.copy_from_slice(&block);
            self.prev = ct;
        }
    }
}

impl MacState for SoftMac {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self) -> [u8; TAG_SIZE] {
        self.0.finalize().into_bytes().into()
    }
}

impl Backend for Soft {
    const KIND: BackendKind = BackendKind::Soft;

    type Encryptor = SoftEncryptor;
    type Decryptor = SoftDecryptor;
    type Mac = SoftMac;

    fn encryptor(key: &[u8], iv: &[u8; IV_SIZE]) -> Result<Self::Encryptor, Error> {
        Ok(SoftEncryptor {
            cipher: BlockCipher::new(key)?,
            prev: *iv,
        })
    }

    fn decryptor(key: &[u8], iv: &[u8; IV_SIZE]) -> Result<Self::Decryptor, Error> {
        Ok(SoftDecryptor {
            cipher: BlockCipher::new(key)?,
            prev: *iv,
        })
    }

    fn mac(key: &[u8]) -> Result<Self::Mac, Error> {
        Ok(SoftMac(<HmacSha256 as Mac>::new_from_slice(key)?))
    }

    fn sha256(data: &[u8]) -> [u8; HASH_SIZE] {
        Sha256::digest(data).into()
    }

    fn fill_random(buf: &mut [u8]) -> Result<(), Error> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|_| Error::Symmetric)
    }
}
