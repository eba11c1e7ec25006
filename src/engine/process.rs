//! Engine child process supervision.
//!
//! # Responsibilities
//! - Launch the engine when the gateway is configured to own it
//! - Forward its stdout/stderr to the log
//! - Flip health back to STARTING if it exits
//! - Kill it on shutdown

use std::io;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::broadcast;

use crate::health::HealthState;

/// A running engine child process.
pub struct EngineProcess {
    child: Child,
    program: String,
}

impl EngineProcess {
    /// Spawn the engine from an argv-style command line.
    pub fn spawn(command: &[String]) -> io::Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty engine command"))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(stdout, "stdout"));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(stderr, "stderr"));
        }

        tracing::info!(program = %program, pid = ?child.id(), "Engine process started");

        Ok(Self {
            child,
            program: program.clone(),
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the child to exit or for shutdown, whichever comes first.
    pub async fn supervise(mut self, health: Arc<HealthState>, mut shutdown: broadcast::Receiver<()>) {
        tokio::select! {
            status = self.child.wait() => {
                match status {
                    Ok(status) => tracing::error!(
                        program = %self.program,
                        status = %status,
                        "Engine process exited"
                    ),
                    Err(e) => tracing::error!(
                        program = %self.program,
                        error = %e,
                        "Failed to wait on engine process"
                    ),
                }
                health.mark_starting();
            }
            _ = shutdown.recv() => {
                tracing::info!(program = %self.program, "Stopping engine process");
                if let Err(e) = self.child.kill().await {
                    tracing::warn!(program = %self.program, error = %e, "Failed to kill engine process");
                }
            }
        }
    }
}

async fn forward_output<R>(reader: R, stream: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(stream, "engine: {}", line);
    }
}
