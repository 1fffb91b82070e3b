use super::{CancelHandle, CipherStream, Ledger, SessionState};
use crate::backend::{Backend, CbcMode, DefaultBackend, MacState};
use crate::consts::*;
use crate::error::Error;
use crate::key::SymKey;
use crate::util::{ciphertext_len_checked, tags_match, unpad};

use core::fmt;

struct Running<B: Backend> {
    cipher: B::Decryptor,
    mac: B::Mac,
    // Ciphertext bytes authenticated and deciphered so far.
    processed: usize,
}

impl<B: Backend> Running<B> {
    fn start(key: &SymKey<B>, iv: &[u8; IV_SIZE]) -> Result<Self, Error> {
        let cipher = B::decryptor(key.cipher_key(), iv)?;
        let mut mac = B::mac(key.hmac_key())?;
        mac.update(iv);

        Ok(Self {
            cipher,
            mac,
            processed: 0,
        })
    }
}

/// A decryption session.
///
/// The last [`TAG_SIZE`] bytes seen are always retained, since they might be the tag. Of the
/// ciphertext before them, complete blocks are authenticated and deciphered right away. The
/// plaintext of the most recent block is withheld until [`finish`][CipherStream::finish], as only
/// then is it known whether it carries the padding.
///
/// Plaintext returned by [`update`][CipherStream::update] is not authenticated yet: it must be
/// discarded unless [`finish`][CipherStream::finish] succeeds.
pub struct DecryptStream<B: Backend = DefaultBackend> {
    key: SymKey<B>,
    iv: Vec<u8>,
    running: Option<Running<B>>,
    pending: Vec<u8>,
    // Empty or exactly one block.
    held: Vec<u8>,
    ledger: Ledger,
}

impl<B: Backend> DecryptStream<B> {
    /// Opens a session under `key`.
    pub fn new(key: &SymKey<B>) -> Self {
        log::debug!("opening decrypt stream ({} backend)", B::KIND);

        Self {
            key: key.clone(),
            iv: Vec::with_capacity(IV_SIZE),
            running: None,
            pending: Vec::new(),
            held: Vec::with_capacity(BLOCK_SIZE),
            ledger: Ledger::new("decrypt"),
        }
    }

    /// Registers a callback receiving the number of input bytes consumed so far after each
    /// processed chunk.
    pub fn with_progress(mut self, f: impl FnMut(u64) + Send + 'static) -> Self {
        self.ledger.set_progress_fn(Box::new(f));
        self
    }

    fn process(&mut self, mut chunk: &[u8]) -> Result<Vec<u8>, Error> {
        let running = match &mut self.running {
            Some(running) => running,
            None => {
                let take = chunk.len().min(IV_SIZE - self.iv.len());
                self.iv.extend_from_slice(&chunk[..take]);
                chunk = &chunk[take..];

                if self.iv.len() < IV_SIZE {
                    return Ok(Vec::new());
                }

                let iv: [u8; IV_SIZE] = self.iv.as_slice().try_into()?;
                self.running.insert(Running::start(&self.key, &iv)?)
            }
        };

        self.pending.extend_from_slice(chunk);

        let available = self.pending.len().saturating_sub(TAG_SIZE);
        let ready = available - available % BLOCK_SIZE;
        if ready == 0 {
            return Ok(Vec::new());
        }

        let mut blocks: Vec<u8> = self.pending.drain(..ready).collect();
        running.mac.update(&blocks);
        running.cipher.process_blocks(&mut blocks);
        running.processed += ready;

        let last = blocks.split_off(ready - BLOCK_SIZE);
        let mut out = core::mem::replace(&mut self.held, last);
        out.extend_from_slice(&blocks);

        Ok(out)
    }

    fn open(&mut self) -> Result<Vec<u8>, Error> {
        let mut running = self.running.take().ok_or_else(|| {
            Error::InvalidArgument(format!(
                "stream ended after {} bytes, before the IV was complete",
                self.iv.len()
            ))
        })?;

        if self.pending.len() < TAG_SIZE {
            return Err(Error::InvalidArgument(format!(
                "stream ended {} bytes short of an authentication tag",
                TAG_SIZE - self.pending.len()
            )));
        }

        let (rest, tag) = self.pending.split_at(self.pending.len() - TAG_SIZE);
        running.mac.update(rest);

        if !tags_match(&running.mac.finalize(), tag) {
            log::warn!("rejecting stream: authentication tag mismatch");
            return Err(Error::InvalidHmac);
        }

        ciphertext_len_checked(running.processed + rest.len())?;

        let mut rest = rest.to_vec();
        running.cipher.process_blocks(&mut rest);
        self.pending.clear();

        let mut out = core::mem::take(&mut self.held);
        out.extend_from_slice(&rest);
        unpad(&mut out)?;

        Ok(out)
    }
}

impl<B: Backend> CipherStream for DecryptStream<B> {
    fn update(&mut self, chunk: &[u8]) -> Result<Vec<u8>, Error> {
        self.ledger.admit()?;

        match self.process(chunk) {
            Ok(out) => {
                self.ledger.record(chunk.len(), out.len());
                Ok(out)
            }
            Err(e) => Err(self.ledger.fail(e)),
        }
    }

    fn finish(&mut self) -> Result<Vec<u8>, Error> {
        self.ledger.admit()?;

        match self.open() {
            Ok(out) => {
                self.ledger.complete(out.len());
                Ok(out)
            }
            Err(e) => Err(self.ledger.fail(e)),
        }
    }

    fn cancel(&mut self) {
        self.ledger.cancel();
    }

    fn state(&self) -> SessionState {
        self.ledger.state()
    }

    fn progress(&self) -> u64 {
        self.ledger.consumed()
    }

    fn produced(&self) -> u64 {
        self.ledger.produced()
    }

    fn cancel_handle(&self) -> CancelHandle {
        self.ledger.cancel_handle()
    }
}

impl<B: Backend> fmt::Debug for DecryptStream<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptStream")
            .field("key", &self.key)
            .field("pending", &self.pending.len())
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}
