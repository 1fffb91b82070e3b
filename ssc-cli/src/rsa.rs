use crate::opts::{RsaKeygenOpts, UnwrapOpts, WrapOpts};
use crate::util::CliResult;

use base64ct::{Base64, Encoding};
use ssc_core::rsa::{PrivateKey, PublicKey};
use ssc_core::SymKey;
use std::fs;

pub fn keygen(opts: RsaKeygenOpts) -> CliResult {
    let RsaKeygenOpts { bits, out } = opts;

    eprintln!("Generating {bits}-bit RSA key pair...");
    let sk = PrivateKey::generate(bits)?;
    let pk = sk.public_key();

    fs::write(format!("{out}.pem"), sk.to_pem()?)?;
    fs::write(format!("{out}.pub.pem"), pk.to_pem()?)?;

    eprintln!("Wrote {out}.pem and {out}.pub.pem");
    println!("{}", pk.fingerprint()?);

    Ok(())
}

pub fn wrap(opts: WrapOpts) -> CliResult {
    let WrapOpts { public, key } = opts;

    let pk = PublicKey::from_pem(&fs::read_to_string(&public)?)?;
    let key: SymKey = key.parse()?;

    log::info!("wrapping key for {}", pk.fingerprint()?);

    let wrapped = pk.encrypt(&key.to_bytes(), true)?;
    println!("{}", Base64::encode_string(&wrapped));

    Ok(())
}

pub fn unwrap(opts: UnwrapOpts) -> CliResult {
    let UnwrapOpts { private, wrapped } = opts;

    let sk = PrivateKey::from_pem(&fs::read_to_string(&private)?)?;
    let wrapped = Base64::decode_vec(wrapped.trim()).map_err(|e| format!("invalid base64: {e}"))?;

    let key = SymKey::<ssc_core::backend::DefaultBackend>::from_bytes(sk.decrypt(&wrapped, true)?)?;
    println!("{}", key.to_b64());

    Ok(())
}
