//! In-memory encryption and decryption of complete messages.

use crate::backend::{Backend, MacState};
use crate::consts::*;
use crate::error::Error;
use crate::key::SymKey;
use crate::util::{ciphertext_len_checked, split_message, tags_match};

impl<B: Backend> SymKey<B> {
    /// Encrypts the entire `plaintext`.
    ///
    /// Returns `IV || AES-CBC(plaintext) || HMAC-SHA256(IV || ciphertext)`.
    pub fn encrypt(&self, plaintext: impl AsRef<[u8]>) -> Result<Vec<u8>, Error> {
        let plaintext = plaintext.as_ref();

        let mut iv = [0u8; IV_SIZE];
        B::fill_random(&mut iv)?;

        let ct = B::encrypt_cbc(self.cipher_key(), &iv, plaintext)?;

        let mut mac = B::mac(self.hmac_key())?;
        mac.update(&iv);
        mac.update(&ct);
        let tag = mac.finalize();

        let mut out = Vec::with_capacity(IV_SIZE + ct.len() + TAG_SIZE);
        out.extend_from_slice(&iv);
        out.extend_from_slice(&ct);
        out.extend_from_slice(&tag);

        Ok(out)
    }

    /// Authenticates and decrypts an entire message.
    ///
    /// Nothing is decrypted unless the tag verifies.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`] if the message is too short or not block aligned,
    /// * [`Error::InvalidHmac`] if the tag does not match (tampering, truncation, wrong key),
    /// * [`Error::InvalidCipherText`] if the authenticated plaintext is not correctly padded.
    pub fn decrypt(&self, message: impl AsRef<[u8]>) -> Result<Vec<u8>, Error> {
        let (iv, ct, tag) = split_message(message.as_ref())?;

        let mut mac = B::mac(self.hmac_key())?;
        mac.update(iv);
        mac.update(ct);

        if !tags_match(&mac.finalize(), tag) {
            log::warn!("rejecting message: authentication tag mismatch");
            return Err(Error::InvalidHmac);
        }

        ciphertext_len_checked(ct.len())?;

        B::decrypt_cbc(self.cipher_key(), iv, ct)
    }
}
