use futures::io::AllowStdIo;
use indicatif::{ProgressBar, ProgressStyle};
use ssc_core::stream::{pipe, CipherStream, PipeTotals};
use std::error::Error;
use std::fs::File;

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] \
    {bytes}/{total_bytes} {binary_bytes_per_sec} ({eta} left)";

pub(crate) type CliResult<T = ()> = Result<T, Box<dyn Error>>;

pub(crate) fn progress_bar(len: u64) -> CliResult<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)?
            .progress_chars("#>-"),
    );

    Ok(pb)
}

/// Pipes `source` through `session` into a new file at `output`.
///
/// Ctrl-C cancels the session. On any failure the output file is removed, it holds either a
/// partial ciphertext or unauthenticated plaintext.
pub(crate) async fn drive<S: CipherStream>(
    mut session: S,
    source: File,
    output: &str,
    chunk_size: usize,
) -> CliResult<PipeTotals> {
    let destination = File::create(output)?;

    let handle = session.cancel_handle();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupted, canceling");
            handle.cancel();
        }
    });

    let res = pipe(
        &mut session,
        AllowStdIo::new(source),
        AllowStdIo::new(destination),
        chunk_size,
    )
    .await;

    watcher.abort();

    match res {
        Ok(totals) => Ok(totals),
        Err(e) => {
            if let Err(rm) = std::fs::remove_file(output) {
                log::error!("failed to remove {output}: {rm}");
            }
            Err(e.into())
        }
    }
}
