use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::model::{COLUMN_DELIMITER, ListingResult, ResourceKind};

/// How a spawned process finished. A spawn failure (binary missing,
/// unstartable) is distinct from a process that ran and exited non-zero.
#[derive(Debug)]
pub enum RunOutcome {
    Exited(std::process::ExitStatus),
    SpawnFailed(String),
}

#[derive(Debug)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub outcome: RunOutcome,
}

/// Shells out to the container engine CLI. One external process per call,
/// never retried; listing failures degrade into short output that the menu
/// treats as "no resources".
#[derive(Debug, Clone)]
pub struct DockerGateway {
    bin: String,
}

impl DockerGateway {
    pub fn new(bin: String) -> Self {
        Self { bin }
    }

    /// Spawns the engine binary with an argument vector and accumulates
    /// stdout and stderr chunks in stream order until the process exits.
    pub async fn run(&self, args: &[&str]) -> CapturedOutput {
        let spawned = TokioCommand::new(&self.bin)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(error) => {
                debug!("failed to spawn {} {args:?}: {error}", self.bin);
                return CapturedOutput {
                    stdout: String::new(),
                    stderr: String::new(),
                    outcome: RunOutcome::SpawnFailed(error.to_string()),
                };
            }
        };

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let (stdout, stderr) = tokio::join!(
            drain_stream(&mut stdout_pipe),
            drain_stream(&mut stderr_pipe)
        );

        let outcome = match child.wait().await {
            Ok(status) => RunOutcome::Exited(status),
            Err(error) => RunOutcome::SpawnFailed(error.to_string()),
        };

        CapturedOutput {
            stdout,
            stderr,
            outcome,
        }
    }

    /// One listing operation parameterized by the resource kind descriptor.
    /// Whatever text was captured is parsed even when the process failed.
    pub async fn list(&self, kind: ResourceKind) -> ListingResult {
        let captured = self.run(kind.listing_args()).await;
        match &captured.outcome {
            RunOutcome::Exited(status) if status.success() => {}
            RunOutcome::Exited(status) => {
                debug!("{} listing exited with {status}", kind.title());
            }
            RunOutcome::SpawnFailed(error) => {
                debug!("{} listing could not start: {error}", kind.title());
            }
        }
        if !captured.stdout.is_empty() {
            debug!("stdout: {}", captured.stdout);
        }
        if !captured.stderr.is_empty() {
            debug!("stderr: {}", captured.stderr);
        }

        parse_listing(&captured.stdout, kind.normalizes_columns())
    }

    /// Runs a filled command template through a shell, because the export
    /// template carries output redirection. Waits for full completion and
    /// never propagates a failure; the returned line feeds the status bar.
    pub async fn execute(&self, command: &str) -> String {
        debug!("executing: {command}");
        let result = TokioCommand::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stdout.trim().is_empty() {
                    debug!("stdout: {stdout}");
                }
                if !stderr.trim().is_empty() {
                    debug!("stderr: {stderr}");
                }
                if output.status.success() {
                    format!("Completed: {command}")
                } else {
                    debug!("command exited with {}", output.status);
                    format!("Failed ({}): {command}", output.status)
                }
            }
            Err(error) => {
                debug!("failed to start shell for '{command}': {error}");
                format!("Failed to start: {command}")
            }
        }
    }
}

async fn drain_stream<R>(pipe: &mut Option<R>) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = pipe.as_mut() else {
        return String::new();
    };

    let mut collected = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(read) => collected.extend_from_slice(&chunk[..read]),
            Err(error) => {
                debug!("pipe read error: {error}");
                break;
            }
        }
    }

    String::from_utf8_lossy(&collected).into_owned()
}

/// Splits captured text into record lines. The buffer always ends with a
/// trailing newline, so the final element of the split is an empty string
/// that callers drop. Tabular output has each line's multi-space column
/// gaps collapsed into [`COLUMN_DELIMITER`].
pub fn parse_listing(raw: &str, normalize: bool) -> ListingResult {
    let records = raw
        .split('\n')
        .map(|line| {
            if normalize {
                collapse_columns(line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>();

    ListingResult {
        raw_line_count: records.len(),
        records,
    }
}

/// Collapses every run of two or more whitespace characters into a single
/// delimiter. Single spaces inside a field survive untouched.
fn collapse_columns(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut run = 0usize;
    for ch in line.chars() {
        if ch.is_whitespace() {
            run += 1;
            continue;
        }
        if run >= 2 {
            out.push(COLUMN_DELIMITER);
        } else if run == 1 {
            out.push(' ');
        }
        run = 0;
        out.push(ch);
    }
    if run >= 2 {
        out.push(COLUMN_DELIMITER);
    } else if run == 1 {
        out.push(' ');
    }
    out
}
