//! # sscrypto core library
#![deny(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links
)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! Authenticated symmetric encryption that behaves identically on every backend, plus an RSA
//! wrapper to exchange the symmetric keys.
//!
//! The library implements Encrypt-then-MAC:
//!
//! * Encrypt: the plaintext is encrypted with AES-CBC (PKCS#7 padding) under a fresh random IV.
//!
//! * MAC: the IV and ciphertext are authenticated using HMAC-SHA256 under a second, independent
//! key. On decryption the tag is checked in constant time before anything is deciphered.
//!
//! A message is laid out as follows:
//!
//! ```text
//! IV (16 bytes) || AES-CBC ciphertext (n × 16 bytes) || HMAC-SHA256 tag (32 bytes)
//! ```
//!
//! A [`SymKey`] holds both sub-keys: the raw key material is `cipher key || hmac key`, 32, 48 or
//! 64 bytes for AES-128, AES-192 and AES-256 respectively.
//!
//! ## Backends
//!
//! The primitives are supplied by a [`Backend`][`backend::Backend`]: [`Native`][`backend::Native`]
//! (feature `"native"`, built on ring) or [`Soft`][`backend::Soft`] (feature `"soft"`, pure
//! RustCrypto). Both produce byte-identical messages and decrypt each other's output. The backend
//! is a type parameter of the key, which defaults to [`DefaultBackend`][`backend::DefaultBackend`].
//!
//! ## Streaming vs In-memory
//!
//! Complete buffers are processed with [`SymKey::encrypt`] and [`SymKey::decrypt`]. For large or
//! arbitrary sized data use a [stream session][`stream`], which accepts the input in chunks of
//! any size, reports progress and can be canceled. Both produce the same format. With the
//! `stream` feature sessions can be driven from `futures` readers and streams.
//!
//! Be aware that a decrypting session emits plaintext before the tag at the very end has been
//! checked. Only use that output if the session completes.
//!
//! ## Examples
//!
//! ### In-memory
//!
//! ```
//! use ssc_core::{KeySize, SymKey};
//! # use ssc_core::error::Error;
//!
//! # fn main() -> Result<(), Error> {
//! let key: SymKey = SymKey::generate(KeySize::Aes256)?;
//!
//! let ct = key.encrypt(b"TESTtest")?;
//! assert_eq!(ct.len(), 64);
//!
//! let imported: SymKey = SymKey::from_b64(&key.to_b64())?;
//! assert_eq!(imported.decrypt(&ct)?, b"TESTtest");
//! # Ok(())
//! # }
//! ```
//!
//! ### Chunk by chunk
//!
//! ```
//! use ssc_core::stream::{CipherStream, SessionState};
//! use ssc_core::{KeySize, SymKey};
//! # use ssc_core::error::Error;
//!
//! # fn main() -> Result<(), Error> {
//! let key: SymKey = SymKey::generate(KeySize::Aes128)?;
//! let mut session = key.encrypt_stream();
//!
//! let mut ct = session.update(b"SECRET ")?;
//! ct.extend(session.update(b"DATA")?);
//! ct.extend(session.finish()?);
//!
//! assert_eq!(session.state(), SessionState::Completed);
//! assert_eq!(key.decrypt(&ct)?, b"SECRET DATA");
//! # Ok(())
//! # }
//! ```
#![cfg_attr(
    feature = "stream",
    doc = r##"
 ### Piping a reader into a writer

 ```
 use ssc_core::stream::pipe;
 use ssc_core::{KeySize, SymKey, DEFAULT_CHUNK_SIZE};
 use futures::io::Cursor;
 # use ssc_core::error::Error;

 # #[tokio::main]
 # async fn main() -> Result<(), Error> {
 let key: SymKey = SymKey::generate(KeySize::Aes256)?;

 let mut sealed = Cursor::new(Vec::new());
 pipe(&mut key.encrypt_stream(), Cursor::new(b"SECRET DATA"), &mut sealed, DEFAULT_CHUNK_SIZE)
     .await?;

 let mut original = Cursor::new(Vec::new());
 pipe(&mut key.decrypt_stream(), Cursor::new(sealed.into_inner()), &mut original, 16).await?;

 assert_eq!(original.into_inner(), b"SECRET DATA");
 # Ok(())
 # }
 ```
"##
)]

pub mod backend;
pub mod consts;
pub mod error;
pub mod key;
pub mod stream;

#[cfg(feature = "rsa")]
#[cfg_attr(docsrs, doc(cfg(feature = "rsa")))]
pub mod rsa;

mod memory;

pub use key::{KeySize, SymKey};

#[doc(hidden)]
pub use consts::*;

#[doc(hidden)]
pub mod test;

mod util;
