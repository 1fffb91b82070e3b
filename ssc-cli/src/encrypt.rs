use crate::opts::{CipherOpts, EncOpts};
use crate::util::{drive, progress_bar, CliResult};

use ssc_core::backend::{Backend, BackendKind, Native, Soft};
use ssc_core::SymKey;
use std::fs::File;

async fn run<B: Backend>(input: &str, output: &str, cipher: &CipherOpts) -> CliResult {
    let key: SymKey<B> = cipher.key.parse()?;

    let source = File::open(input)?;
    let pb = progress_bar(source.metadata()?.len())?;
    let bar = pb.clone();

    let session = key
        .encrypt_stream()
        .with_progress(move |done| bar.set_position(done));

    eprintln!("Encrypting {input} ({} backend)...", B::KIND);

    let totals = drive(session, source, output, cipher.chunk_size).await;
    pb.finish_and_clear();
    let totals = totals?;

    eprintln!(
        "Wrote {} bytes to {output} ({} bytes of plaintext)",
        totals.produced, totals.consumed
    );

    Ok(())
}

pub async fn exec(enc_opts: EncOpts) -> CliResult {
    let EncOpts {
        input,
        output,
        cipher,
    } = enc_opts;

    let output = output.unwrap_or_else(|| format!("{input}.enc"));

    match cipher.backend {
        BackendKind::Native => run::<Native>(&input, &output, &cipher).await,
        BackendKind::Soft => run::<Soft>(&input, &output, &cipher).await,
    }
}
