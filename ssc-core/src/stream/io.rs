//! Asynchronous adapters.

use super::CipherStream;
use crate::error::Error;

use futures::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use futures::stream::{self, Stream, StreamExt};

/// Byte counts of a completed [`pipe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipeTotals {
    /// Bytes read from the source.
    pub consumed: u64,
    /// Bytes written to the sink.
    pub produced: u64,
}

/// Drives `session` with everything read from `r`, writing all output into `w`.
///
/// Reads at most `chunk_size` bytes at a time. The writer is flushed and closed once the
/// session finished. Cancellation through the session's [`CancelHandle`][super::CancelHandle]
/// aborts the pipe with [`Error::StreamCanceled`] at the next chunk. A failing reader or writer
/// cancels the session, so it never accepts input again.
pub async fn pipe<S, R, W>(
    session: &mut S,
    r: R,
    w: W,
    chunk_size: usize,
) -> Result<PipeTotals, Error>
where
    S: CipherStream + ?Sized,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if chunk_size == 0 {
        return Err(Error::InvalidArgument(
            "chunk size must be positive".to_string(),
        ));
    }

    if let Err(e) = pump(session, r, w, chunk_size).await {
        session.cancel();
        return Err(e);
    }

    Ok(PipeTotals {
        consumed: session.progress(),
        produced: session.produced(),
    })
}

async fn pump<S, R, W>(
    session: &mut S,
    mut r: R,
    mut w: W,
    chunk_size: usize,
) -> Result<(), Error>
where
    S: CipherStream + ?Sized,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; chunk_size];

    loop {
        let read = r.read(&mut buf).await?;
        if read == 0 {
            break;
        }

        let out = session.update(&buf[..read])?;
        if !out.is_empty() {
            w.write_all(&out).await?;
        }
    }

    let out = session.finish()?;
    w.write_all(&out).await?;

    w.flush().await?;
    w.close().await?;

    Ok(())
}

/// Turns a stream of input chunks into a stream of output chunks.
///
/// Empty intermediate outputs are skipped. The stream ends after the first error, an error of
/// the input cancels the session. Transforms compose, e.g. an encrypting transform can feed a
/// decrypting one directly.
pub fn transform<S, St>(session: S, input: St) -> impl Stream<Item = Result<Vec<u8>, Error>>
where
    S: CipherStream,
    St: Stream<Item = Result<Vec<u8>, Error>>,
{
    let input = Box::pin(input);

    stream::unfold(Some((session, input)), |state| async move {
        let Some((mut session, mut input)) = state else {
            return None;
        };

        loop {
            match input.next().await {
                Some(Ok(chunk)) => match session.update(&chunk) {
                    Ok(out) if out.is_empty() => continue,
                    Ok(out) => return Some((Ok(out), Some((session, input)))),
                    Err(e) => return Some((Err(e), None)),
                },
                Some(Err(e)) => {
                    session.cancel();
                    return Some((Err(e), None));
                }
                None => return Some((session.finish(), None)),
            }
        }
    })
}
