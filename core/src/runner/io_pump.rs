use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;

use crate::error::RunnerError;
use crate::util::CaptureBuffer;

pub fn pump_stdout<R>(rd: R, buf: Arc<CaptureBuffer>) -> JoinHandle<Result<u64, RunnerError>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    pump(rd, buf, "stdout")
}

pub fn pump_stderr<R>(rd: R, buf: Arc<CaptureBuffer>) -> JoinHandle<Result<u64, RunnerError>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    pump(rd, buf, "stderr")
}

// Reads to EOF even once the buffer is full so the child never blocks on a
// full pipe.
fn pump<R>(
    mut rd: R,
    buf: Arc<CaptureBuffer>,
    label: &'static str,
) -> JoinHandle<Result<u64, RunnerError>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut chunk = vec![0u8; 16 * 1024];
        let mut total = 0u64;

        loop {
            let n = rd.read(&mut chunk).await.map_err(|e| RunnerError::StreamIo {
                stream: label,
                source: e,
            })?;
            if n == 0 {
                break;
            }
            buf.push(&chunk[..n]);
            total += n as u64;
        }

        if buf.truncated() {
            tracing::warn!(
                stream = label,
                kept = buf.len(),
                total = total,
                "tool output exceeded capture limit, truncated"
            );
        }

        Ok(total)
    })
}
