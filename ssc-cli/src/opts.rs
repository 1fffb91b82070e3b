use clap::{Args, Parser, ValueHint};
use ssc_core::backend::BackendKind;
use ssc_core::DEFAULT_CHUNK_SIZE;

/// Command line interface for sscrypto, authenticated AES-CBC + HMAC-SHA256 encryption.
#[derive(Parser, Debug)]
#[clap(name = "ssc-cli", version)]
pub struct Opts {
    #[clap(subcommand)]
    pub subcmd: Subcommand,
}

#[derive(Parser, Debug)]
pub enum Subcommand {
    Keygen(KeygenOpts),
    Enc(EncOpts),
    Dec(DecOpts),
    RsaKeygen(RsaKeygenOpts),
    Wrap(WrapOpts),
    Unwrap(UnwrapOpts),
}

/// Generate a symmetric key and print it as base64.
#[derive(Parser, Debug)]
#[clap(name = "Keygen")]
pub struct KeygenOpts {
    /// AES key size in bits: 128, 192 or 256.
    #[clap(short, long, default_value_t = 256)]
    pub size: u16,

    /// Backend drawing the random key material.
    #[clap(short, long, default_value = "native")]
    pub backend: BackendKind,
}

/// Symmetric cipher settings shared by `enc` and `dec`.
#[derive(Args, Debug)]
pub struct CipherOpts {
    /// Base64 encoded symmetric key.
    #[clap(short, long, env = "SSC_KEY", hide_env_values = true)]
    pub key: String,

    /// Crypto backend: native or soft.
    #[clap(short, long, default_value = "native")]
    pub backend: BackendKind,

    /// Number of bytes read per chunk.
    #[clap(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

/// Encrypt a file.
#[derive(Parser, Debug)]
#[clap(name = "Encrypt")]
pub struct EncOpts {
    /// Input file.
    #[clap(index = 1, value_hint = ValueHint::FilePath)]
    pub input: String,

    /// Output file, defaults to the input file name with `.enc` appended.
    #[clap(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<String>,

    #[clap(flatten)]
    pub cipher: CipherOpts,
}

/// Decrypt a file.
#[derive(Parser, Debug)]
#[clap(name = "Decrypt")]
pub struct DecOpts {
    /// Input file.
    #[clap(index = 1, value_hint = ValueHint::FilePath)]
    pub input: String,

    /// Output file, defaults to the input file name without `.enc`.
    #[clap(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<String>,

    #[clap(flatten)]
    pub cipher: CipherOpts,
}

/// Generate an RSA key pair, written as PKCS#1 PEM files.
#[derive(Parser, Debug)]
#[clap(name = "RsaKeygen")]
pub struct RsaKeygenOpts {
    /// Modulus size in bits: 1024, 2048 or 4096.
    #[clap(long, default_value_t = 2048)]
    pub bits: usize,

    /// Writes `<OUT>.pem` and `<OUT>.pub.pem`.
    #[clap(short, long, default_value = "ssc_rsa", value_hint = ValueHint::FilePath)]
    pub out: String,
}

/// Encrypt a symmetric key for the holder of an RSA private key.
#[derive(Parser, Debug)]
#[clap(name = "Wrap")]
pub struct WrapOpts {
    /// PEM file holding the recipient's RSA public key.
    #[clap(short, long, value_hint = ValueHint::FilePath)]
    pub public: String,

    /// Base64 encoded symmetric key to wrap.
    #[clap(short, long, env = "SSC_KEY", hide_env_values = true)]
    pub key: String,
}

/// Recover a symmetric key wrapped with `wrap`.
#[derive(Parser, Debug)]
#[clap(name = "Unwrap")]
pub struct UnwrapOpts {
    /// PEM file holding the RSA private key.
    #[clap(short, long, value_hint = ValueHint::FilePath)]
    pub private: String,

    /// Base64 encoded wrapped key.
    #[clap(index = 1)]
    pub wrapped: String,
}
