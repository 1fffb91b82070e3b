//! Messages produced by one backend must be accepted by the other, whatever the buffering.
#![cfg(all(feature = "native", feature = "soft"))]

use ssc_core::backend::{Backend, Native, Soft};
use ssc_core::error::Error;
use ssc_core::stream::{CipherStream, SessionState};
use ssc_core::test::{rand_vec, split_length};
use ssc_core::{KeySize, SymKey};

fn stream_through<S: CipherStream>(mut session: S, input: &[u8], chunk: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for piece in split_length(input, chunk) {
        out.extend(session.update(&piece).unwrap());
    }
    out.extend(session.finish().unwrap());

    assert_eq!(session.state(), SessionState::Completed);
    out
}

fn interop<E: Backend, D: Backend>() {
    for size in [KeySize::Aes128, KeySize::Aes192, KeySize::Aes256] {
        let enc_key = SymKey::<E>::generate(size).unwrap();
        let dec_key = enc_key.with_backend::<D>();

        for len in [0, 8, 16, 1000] {
            let plain = rand_vec(len);

            // One-shot into one-shot.
            let ct = enc_key.encrypt(&plain).unwrap();
            assert_eq!(dec_key.decrypt(&ct).unwrap(), plain);

            // One-shot into streaming.
            assert_eq!(stream_through(dec_key.decrypt_stream(), &ct, 15), plain);

            // Streaming into one-shot and into streaming.
            let ct = stream_through(enc_key.encrypt_stream(), &plain, 20);
            assert_eq!(dec_key.decrypt(&ct).unwrap(), plain);
            assert_eq!(stream_through(dec_key.decrypt_stream(), &ct, 33), plain);
        }
    }
}

#[test]
fn native_to_soft() {
    interop::<Native, Soft>();
}

#[test]
fn soft_to_native() {
    interop::<Soft, Native>();
}

#[test]
fn imported_key_on_other_backend() {
    let key = SymKey::<Native>::generate(KeySize::Aes256).unwrap();
    let ct = key.encrypt(b"TESTtest").unwrap();

    let soft = SymKey::<Soft>::from_b64(&key.to_b64()).unwrap();
    assert_eq!(soft.decrypt(&ct).unwrap(), b"TESTtest");
}

#[test]
fn tampering_detected_across_backends() {
    let key = SymKey::<Soft>::generate(KeySize::Aes256).unwrap();
    let mut ct = key.encrypt(rand_vec(64)).unwrap();
    ct[20] ^= 0x04;

    assert!(matches!(
        key.with_backend::<Native>().decrypt(&ct),
        Err(Error::InvalidHmac)
    ));
}
