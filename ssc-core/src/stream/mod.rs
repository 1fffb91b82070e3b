//! Chunked encryption and decryption.
//!
//! A session consumes input in chunks of arbitrary size and returns output as soon as it can be
//! produced. Sessions use exactly the same message format as [`SymKey::encrypt`] and
//! [`SymKey::decrypt`], so a message encrypted in one go can be decrypted in chunks and the
//! other way around.
//!
//! Note that during decryption, plaintext is released before the authentication tag at the end
//! of the message has been checked. Only output of a session that reached
//! [`SessionState::Completed`] is authentic, discard everything else.
//!
//! With the `stream` feature the sessions can be driven by `futures` readers, writers and
//! streams, see `pipe` and `transform`.

mod decrypt;
mod encrypt;

#[cfg(feature = "stream")]
mod io;

pub use decrypt::DecryptStream;
pub use encrypt::EncryptStream;

#[cfg(feature = "stream")]
pub use io::{pipe, transform, PipeTotals};

use crate::backend::Backend;
use crate::error::Error;
use crate::key::SymKey;

use core::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lifecycle of a stream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Accepting input.
    Active,
    /// Canceled by the caller. Terminal.
    Canceled,
    /// The whole message was processed successfully. Terminal.
    Completed,
    /// Processing failed. Terminal.
    Failed,
}

impl SessionState {
    /// Whether the session still accepts input.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Cancels a session from elsewhere, e.g. another task or a signal handler.
///
/// The session reports [`SessionState::Canceled`] as soon as the handle is triggered and
/// refuses any further `update` or `finish`.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Common interface of [`EncryptStream`] and [`DecryptStream`].
pub trait CipherStream: Send {
    /// Processes the next chunk of input, returning whatever output became available.
    ///
    /// The returned buffer may be empty.
    fn update(&mut self, chunk: &[u8]) -> Result<Vec<u8>, Error>;

    /// Signals the end of the input and returns the remaining output.
    fn finish(&mut self) -> Result<Vec<u8>, Error>;

    /// Cancels the session. Idempotent and irreversible.
    fn cancel(&mut self);

    /// The current lifecycle state.
    fn state(&self) -> SessionState;

    /// Total number of input bytes consumed.
    fn progress(&self) -> u64;

    /// Total number of output bytes produced.
    fn produced(&self) -> u64;

    /// A handle that cancels this session.
    fn cancel_handle(&self) -> CancelHandle;
}

type ProgressFn = Box<dyn FnMut(u64) + Send>;

/// Bookkeeping shared by both directions.
pub(crate) struct Ledger {
    direction: &'static str,
    state: SessionState,
    consumed: u64,
    produced: u64,
    cancel: CancelHandle,
    on_progress: Option<ProgressFn>,
}

impl Ledger {
    pub(crate) fn new(direction: &'static str) -> Self {
        Self {
            direction,
            state: SessionState::Active,
            consumed: 0,
            produced: 0,
            cancel: CancelHandle::default(),
            on_progress: None,
        }
    }

    pub(crate) fn set_progress_fn(&mut self, f: ProgressFn) {
        self.on_progress = Some(f);
    }

    /// Fails unless the session may process more input.
    pub(crate) fn admit(&mut self) -> Result<(), Error> {
        if self.state.is_active() && self.cancel.is_canceled() {
            self.state = SessionState::Canceled;
            log::warn!(
                "{} stream canceled after {} bytes",
                self.direction,
                self.consumed
            );
        }

        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Canceled => Err(Error::StreamCanceled),
            s => Err(Error::StreamClosed(s)),
        }
    }

    pub(crate) fn record(&mut self, consumed: usize, produced: usize) {
        self.consumed += consumed as u64;
        self.produced += produced as u64;

        if consumed > 0 {
            if let Some(f) = self.on_progress.as_mut() {
                f(self.consumed);
            }
        }
    }

    pub(crate) fn complete(&mut self, produced: usize) {
        self.record(0, produced);
        self.state = SessionState::Completed;

        log::debug!(
            "{} stream completed: {} bytes in, {} bytes out",
            self.direction,
            self.consumed,
            self.produced
        );
    }

    pub(crate) fn fail(&mut self, e: Error) -> Error {
        self.state = SessionState::Failed;
        log::warn!("{} stream failed: {e}", self.direction);

        e
    }

    pub(crate) fn cancel(&mut self) {
        self.cancel.cancel();
        if self.state.is_active() {
            self.state = SessionState::Canceled;
            log::warn!(
                "{} stream canceled after {} bytes",
                self.direction,
                self.consumed
            );
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        match self.state {
            SessionState::Active if self.cancel.is_canceled() => SessionState::Canceled,
            s => s,
        }
    }

    pub(crate) fn consumed(&self) -> u64 {
        self.consumed
    }

    pub(crate) fn produced(&self) -> u64 {
        self.produced
    }

    pub(crate) fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("direction", &self.direction)
            .field("state", &self.state)
            .field("consumed", &self.consumed)
            .field("produced", &self.produced)
            .field("canceled", &self.cancel.is_canceled())
            .finish()
    }
}

impl<B: Backend> SymKey<B> {
    /// Opens an encryption session.
    pub fn encrypt_stream(&self) -> EncryptStream<B> {
        EncryptStream::new(self)
    }

    /// Opens a decryption session.
    pub fn decrypt_stream(&self) -> DecryptStream<B> {
        DecryptStream::new(self)
    }
}
