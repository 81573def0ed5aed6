// src/exec/runner.rs

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::{Origin, RunEvent};
use crate::exec::operation::Operation;

/// Capacity of the per-operation event channel. Senders block when the
/// consumer lags, which backpressures the child through its pipes.
const EVENT_BUFFER: usize = 64;

/// Read buffer size for each output pipe.
const CHUNK_SIZE: usize = 8192;

/// Run an operation in the background and return the receiving end of its
/// event stream. The stream is finite and ends right after the terminal
/// event; dropping the receiver kills the child.
pub fn spawn_operation(operation: Operation) -> mpsc::Receiver<RunEvent> {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(async move {
        run_operation(operation, tx).await;
    });
    rx
}

/// Run one external process, pushing every `RunEvent` into `tx`.
///
/// Exactly one terminal event is sent: `Completed { code }` once the
/// process exits (pipes fully drained first, so the terminal event is
/// always last), or `Failed { message }` when the process cannot be
/// spawned or waited on. A non-zero exit is a `Completed` event, never a
/// `Failed` one.
pub async fn run_operation(operation: Operation, tx: mpsc::Sender<RunEvent>) {
    let rendered = operation.to_string();

    match run_to_exit(operation, &tx).await {
        Ok(Some(code)) => {
            let _ = tx.send(RunEvent::Completed { code }).await;
        }
        Ok(None) => {
            debug!(operation = %rendered, "stream consumer gone before completion");
        }
        Err(err) => {
            warn!(operation = %rendered, error = %err, "operation failed to run");
            let _ = tx
                .send(RunEvent::Failed {
                    message: format!("{err:#}"),
                })
                .await;
        }
    }
}

/// Spawn the child and pump its pipes until exit.
///
/// Returns `Ok(Some(code))` on process exit, `Ok(None)` when the consumer
/// disconnected mid-run (the child is killed in that case).
async fn run_to_exit(operation: Operation, tx: &mpsc::Sender<RunEvent>) -> Result<Option<i32>> {
    info!(operation = %operation, cwd = ?operation.working_dir(), "starting process");

    let mut cmd = operation.to_command();
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning `{operation}`"))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let out_pump = spawn_pipe_pump(Origin::Stdout, stdout, tx.clone());
    let err_pump = spawn_pipe_pump(Origin::Stderr, stderr, tx.clone());

    let wait_result = tokio::select! {
        status = child.wait() => status,
        // The receiver was dropped: the client is gone. Kill the child so a
        // long-running deploy script is not left orphaned.
        _ = tx.closed() => {
            warn!(operation = %operation, "stream consumer disconnected; killing process");
            if let Err(err) = child.kill().await {
                warn!(operation = %operation, error = %err, "failed to kill process after disconnect");
            }
            return Ok(None);
        }
    };

    // Drain both pipes before reporting termination so the terminal event
    // is always the last one observed.
    let _ = out_pump.await;
    let _ = err_pump.await;

    let status = wait_result.with_context(|| format!("waiting for `{operation}`"))?;
    let code = status.code().unwrap_or(-1);

    info!(
        operation = %operation,
        exit_code = code,
        success = status.success(),
        "process exited"
    );

    Ok(Some(code))
}

/// Forward raw chunks from one pipe into the event channel.
///
/// Chunks are passed through at whatever byte boundaries the pipe delivers;
/// no line buffering. Invalid UTF-8 is replaced rather than dropped.
fn spawn_pipe_pump<R>(
    origin: Origin,
    pipe: Option<R>,
    tx: mpsc::Sender<RunEvent>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let Some(mut pipe) = pipe else { return };
        let mut buf = [0u8; CHUNK_SIZE];

        loop {
            match pipe.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                    if tx
                        .send(RunEvent::OutputChunk { origin, text })
                        .await
                        .is_err()
                    {
                        // Consumer is gone; the runner will notice and kill
                        // the child.
                        break;
                    }
                }
                Err(err) => {
                    debug!(%origin, error = %err, "pipe read error");
                    break;
                }
            }
        }

        debug!(%origin, "pipe pump ended");
    })
}
