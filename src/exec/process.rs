// src/exec/process.rs

//! Supervision of a single engine process.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::command::CommandLine;
use crate::errors::AttemptError;
use crate::exec::attempt::{AttemptHandle, AttemptLimits, AttemptOutcome, AttemptSignal, attempt_channel};
use crate::exec::outcome::reduce_process_output;

const READ_CHUNK: usize = 8 * 1024;

/// Start one attempt of `command` in the background.
///
/// The process is spawned on a Tokio task after yielding once, so the caller
/// can cancel the returned handle before anything is started.
pub fn spawn_attempt(command: CommandLine, limits: AttemptLimits) -> AttemptHandle {
    let (handle, signal) = attempt_channel();
    tokio::spawn(run_attempt(command, limits, signal));
    handle
}

async fn run_attempt(command: CommandLine, limits: AttemptLimits, mut signal: AttemptSignal) {
    tokio::task::yield_now().await;
    if signal.is_canceled() {
        debug!(program = %command.program, "attempt canceled before spawn");
        return;
    }

    match supervise(&command, limits, &mut signal).await {
        Some(outcome) => {
            if !signal.finish(outcome) {
                debug!(program = %command.program, "attempt outcome suppressed");
            }
        }
        None => {
            debug!(program = %command.program, "attempt canceled; no outcome delivered");
        }
    }
}

/// Run the process to completion, timeout, output overflow or cancellation.
///
/// Returns `None` only when canceled. The child is killed on every path.
async fn supervise(
    command: &CommandLine,
    limits: AttemptLimits,
    signal: &mut AttemptSignal,
) -> Option<AttemptOutcome> {
    let mut child = match command.to_command().spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(program = %command.program, error = %e, "failed to spawn engine process");
            return Some(Err(AttemptError::Spawn(format!("{}: {e}", command.program))));
        }
    };

    let pid = child.id();
    info!(pid, cmd = %command, "starting engine process");

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let max = limits.max_output_bytes;

    let run = async {
        let (out, err) = tokio::try_join!(read_capped(stdout, max), read_capped(stderr, max))?;
        let status = child
            .wait()
            .await
            .map_err(|e| AttemptError::Io(format!("waiting for engine process: {e}")))?;
        Ok::<_, AttemptError>((status, out, err))
    };

    let result = tokio::select! {
        res = run => Some(res),

        _ = tokio::time::sleep(limits.exec_timeout) => {
            warn!(
                pid,
                timeout_ms = limits.exec_timeout.as_millis() as u64,
                "engine process exceeded execution timeout; killing"
            );
            Some(Err(AttemptError::ExecTimeout(limits.exec_timeout)))
        }

        _ = signal.cancelled() => {
            info!(pid, "cancellation requested for engine process; killing");
            None
        }
    };

    terminate(&mut child, pid).await;

    match result? {
        Ok((status, out, err)) => {
            debug!(
                pid,
                exit_code = ?status.code(),
                stdout_bytes = out.len(),
                stderr_bytes = err.len(),
                "engine process exited"
            );
            Some(reduce_process_output(status.code(), &out, &err))
        }
        Err(e) => Some(Err(e)),
    }
}

/// Kill the child unless it has already been reaped.
async fn terminate(child: &mut Child, pid: Option<u32>) {
    if let Ok(Some(_)) = child.try_wait() {
        return;
    }
    if let Err(e) = child.kill().await {
        warn!(pid, error = %e, "failed to kill engine process");
    }
}

/// Drain a stream, failing once more than `max` bytes arrive.
async fn read_capped<R>(reader: Option<R>, max: usize) -> Result<Vec<u8>, AttemptError>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(Vec::new());
    };

    let mut buf = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(|e| AttemptError::Io(format!("reading engine output: {e}")))?;
        if n == 0 {
            return Ok(buf);
        }
        if buf.len() + n > max {
            return Err(AttemptError::OutputLimit(max));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}
