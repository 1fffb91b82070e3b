use crate::opts::{CipherOpts, DecOpts};
use crate::util::{drive, progress_bar, CliResult};

use ssc_core::backend::{Backend, BackendKind, Native, Soft};
use ssc_core::SymKey;
use std::fs::File;

const FILE_EXT: &str = ".enc";

async fn run<B: Backend>(input: &str, output: &str, cipher: &CipherOpts) -> CliResult {
    let key: SymKey<B> = cipher.key.parse()?;

    let source = File::open(input)?;
    let pb = progress_bar(source.metadata()?.len())?;
    let bar = pb.clone();

    let session = key
        .decrypt_stream()
        .with_progress(move |done| bar.set_position(done));

    eprintln!("Decrypting {input} ({} backend)...", B::KIND);

    let totals = drive(session, source, output, cipher.chunk_size).await;
    pb.finish_and_clear();
    let totals = totals?;

    eprintln!(
        "Authenticated and wrote {} bytes to {output}",
        totals.produced
    );

    Ok(())
}

pub async fn exec(dec_opts: DecOpts) -> CliResult {
    let DecOpts {
        input,
        output,
        cipher,
    } = dec_opts;

    let output = match output {
        Some(output) => output,
        None => match input.strip_suffix(FILE_EXT) {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => return Err(format!("{input} does not end with {FILE_EXT}, pass --output").into()),
        },
    };

    match cipher.backend {
        BackendKind::Native => run::<Native>(&input, &output, &cipher).await,
        BackendKind::Soft => run::<Soft>(&input, &output, &cipher).await,
    }
}
