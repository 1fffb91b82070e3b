use crate::opts::KeygenOpts;
use crate::util::CliResult;

use ssc_core::backend::{BackendKind, Native, Soft};
use ssc_core::{KeySize, SymKey};

pub fn exec(opts: KeygenOpts) -> CliResult {
    let KeygenOpts { size, backend } = opts;
    let size = KeySize::try_from(size)?;

    let b64 = match backend {
        BackendKind::Native => SymKey::<Native>::generate(size)?.to_b64(),
        BackendKind::Soft => SymKey::<Soft>::generate(size)?.to_b64(),
    };

    println!("{b64}");

    Ok(())
}
