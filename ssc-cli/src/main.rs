mod decrypt;
mod encrypt;
mod keygen;
mod opts;
mod rsa;
mod util;

use crate::opts::{Opts, Subcommand};
use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let opts = Opts::parse();

    let res = match opts.subcmd {
        Subcommand::Keygen(o) => crate::keygen::exec(o),
        Subcommand::Enc(o) => crate::encrypt::exec(o).await,
        Subcommand::Dec(o) => crate::decrypt::exec(o).await,
        Subcommand::RsaKeygen(o) => crate::rsa::keygen(o),
        Subcommand::Wrap(o) => crate::rsa::wrap(o),
        Subcommand::Unwrap(o) => crate::rsa::unwrap(o),
    };

    if let Err(e) = res {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
