use super::{CancelHandle, CipherStream, Ledger, SessionState};
use crate::backend::{Backend, CbcMode, DefaultBackend, MacState};
use crate::consts::*;
use crate::error::Error;
use crate::key::SymKey;
use crate::util::pad_block;

use core::fmt;

struct Running<B: Backend> {
    cipher: B::Encryptor,
    mac: B::Mac,
}

impl<B: Backend> Running<B> {
    fn start(key: &SymKey<B>) -> Result<(Self, [u8; IV_SIZE]), Error> {
        let mut iv = [0u8; IV_SIZE];
        B::fill_random(&mut iv)?;

        let cipher = B::encryptor(key.cipher_key(), &iv)?;
        let mut mac = B::mac(key.hmac_key())?;
        mac.update(&iv);

        Ok((Self { cipher, mac }, iv))
    }
}

/// An encryption session.
///
/// The first output carries the IV, the output of [`finish`][CipherStream::finish] ends with the
/// authentication tag. Concatenating all outputs yields a regular message.
pub struct EncryptStream<B: Backend = DefaultBackend> {
    key: SymKey<B>,
    running: Option<Running<B>>,
    // Always shorter than a block between calls.
    pending: Vec<u8>,
    ledger: Ledger,
}

impl<B: Backend> EncryptStream<B> {
    /// Opens a session under `key`. The IV is drawn once the first input arrives.
    pub fn new(key: &SymKey<B>) -> Self {
        log::debug!("opening encrypt stream ({} backend)", B::KIND);

        Self {
            key: key.clone(),
            running: None,
            pending: Vec::with_capacity(BLOCK_SIZE),
            ledger: Ledger::new("encrypt"),
        }
    }

    /// Registers a callback receiving the number of input bytes consumed so far after each
    /// processed chunk.
    pub fn with_progress(mut self, f: impl FnMut(u64) + Send + 'static) -> Self {
        self.ledger.set_progress_fn(Box::new(f));
        self
    }

    fn process(&mut self, chunk: &[u8]) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(IV_SIZE + self.pending.len() + chunk.len());

        let running = match &mut self.running {
            Some(running) => running,
            None => {
                let (running, iv) = Running::start(&self.key)?;
                out.extend_from_slice(&iv);
                self.running.insert(running)
            }
        };

        self.pending.extend_from_slice(chunk);
        let full = self.pending.len() - self.pending.len() % BLOCK_SIZE;

        if full > 0 {
            let start = out.len();
            out.extend(self.pending.drain(..full));

            let blocks = &mut out[start..];
            running.cipher.process_blocks(blocks);
            running.mac.update(blocks);
        }

        Ok(out)
    }

    fn seal(&mut self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::with_capacity(IV_SIZE + BLOCK_SIZE + TAG_SIZE);

        let mut running = match self.running.take() {
            Some(running) => running,
            None => {
                let (running, iv) = Running::start(&self.key)?;
                out.extend_from_slice(&iv);
                running
            }
        };

        let start = out.len();
        out.extend_from_slice(&pad_block(&self.pending));
        self.pending.clear();

        let last = &mut out[start..];
        running.cipher.process_blocks(last);
        running.mac.update(last);

        out.extend_from_slice(&running.mac.finalize());

        Ok(out)
    }
}

impl<B: Backend> CipherStream for EncryptStream<B> {
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

        match self.seal() {
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

impl<B: Backend> fmt::Debug for EncryptStream<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptStream")
            .field("key", &self.key)
            .field("started", &self.running.is_some())
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeySize;
    use crate::test::{rand_vec, split_length};

    use std::sync::{Arc, Mutex};

    fn encrypt_in_chunks<B: Backend>(key: &SymKey<B>, plain: &[u8], size: usize) -> Vec<u8> {
        let mut session = key.encrypt_stream();
        let mut out = Vec::new();

        for chunk in split_length(plain, size) {
            out.extend(session.update(&chunk).unwrap());
        }
        out.extend(session.finish().unwrap());

        assert_eq!(session.state(), SessionState::Completed);
        out
    }

    fn decrypts_as_one_shot<B: Backend>() {
        let key = SymKey::<B>::generate(KeySize::Aes256).unwrap();
        let plain = rand_vec(1000);

        for size in [1, 15, 16, 20, 33, 1000, 4096] {
            let ct = encrypt_in_chunks(&key, &plain, size);
            assert_eq!(ct.len(), IV_SIZE + 1008 + TAG_SIZE);
            assert_eq!(key.decrypt(&ct).unwrap(), plain);
        }
    }

    fn iv_leads_first_output<B: Backend>() {
        let key = SymKey::<B>::generate(KeySize::Aes128).unwrap();
        let mut session = key.encrypt_stream();

        // Not enough for a block, but the IV is released right away.
        let first = session.update(b"abc").unwrap();
        assert_eq!(first.len(), IV_SIZE);

        let second = session.update(&[0u8; 13]).unwrap();
        assert_eq!(second.len(), BLOCK_SIZE);

        let last = session.finish().unwrap();
        assert_eq!(last.len(), BLOCK_SIZE + TAG_SIZE);
        assert_eq!(session.produced(), (IV_SIZE + 2 * BLOCK_SIZE + TAG_SIZE) as u64);
    }

    fn empty_input<B: Backend>() {
        let key = SymKey::<B>::generate(KeySize::Aes192).unwrap();
        let mut session = key.encrypt_stream();

        let ct = session.finish().unwrap();
        assert_eq!(ct.len(), MIN_MESSAGE_SIZE);
        assert!(key.decrypt(&ct).unwrap().is_empty());
        assert_eq!(session.progress(), 0);
    }

    fn progress_is_monotonic<B: Backend>() {
        let key = SymKey::<B>::generate(KeySize::Aes256).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut session = key
            .encrypt_stream()
            .with_progress(move |n| sink.lock().unwrap().push(n));

        for chunk in split_length(&rand_vec(100), 30) {
            session.update(&chunk).unwrap();
        }
        session.finish().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![30, 60, 90, 100]);
        assert_eq!(session.progress(), 100);
    }

    fn cancel_stops_processing<B: Backend>() {
        let key = SymKey::<B>::generate(KeySize::Aes256).unwrap();
        let mut session = key.encrypt_stream();

        session.update(&[1u8; 50]).unwrap();
        session.cancel();

        assert!(matches!(session.update(&[1u8; 50]), Err(Error::StreamCanceled)));
        assert!(matches!(session.finish(), Err(Error::StreamCanceled)));
        assert_eq!(session.progress(), 50);
        assert_eq!(session.state(), SessionState::Canceled);

        session.cancel();
        assert_eq!(session.state(), SessionState::Canceled);
    }

    fn closed_after_finish<B: Backend>() {
        let key = SymKey::<B>::generate(KeySize::Aes128).unwrap();
        let mut session = key.encrypt_stream();
        session.finish().unwrap();

        assert!(matches!(
            session.update(b"late"),
            Err(Error::StreamClosed(SessionState::Completed))
        ));
        assert!(matches!(
            session.finish(),
            Err(Error::StreamClosed(SessionState::Completed))
        ));
    }

    crate::backend_tests!(
        decrypts_as_one_shot,
        iv_leads_first_output,
        empty_input,
        progress_is_monotonic,
        cancel_stops_processing,
        closed_after_finish,
    );
}
