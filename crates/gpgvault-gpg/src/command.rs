//! Invocation of the external `gpg` process.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::GpgError;
use crate::Result;

/// Default cap on captured stdout/stderr.
const DEFAULT_MAX_OUTPUT: usize = 16 * 1024 * 1024;

/// Output of a finished engine process.
#[derive(Debug, Clone)]
pub struct GpgOutput {
    /// Exit code (-1 when killed by a signal).
    pub exit_code: i32,

    /// Raw standard output.
    pub stdout: Vec<u8>,

    /// Standard error, lossily decoded.
    pub stderr: String,

    /// Wall time in milliseconds.
    pub duration_ms: u64,
}

impl GpgOutput {
    /// Check if the engine exited successfully.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// `[GNUPG:]` status lines, when `--status-fd 1` was requested.
    ///
    /// Lines are decoded one at a time. User ids are echoed in whatever
    /// encoding the key carries, so a line that is not UTF-8 is skipped
    /// without hiding the rest.
    pub fn status_lines(&self) -> impl Iterator<Item = &str> {
        self.stdout
            .split(|b| *b == b'\n')
            .filter_map(|line| std::str::from_utf8(line).ok())
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter_map(|line| line.strip_prefix("[GNUPG:] "))
    }

    /// Last non-empty stderr line, for error messages.
    pub fn stderr_summary(&self) -> &str {
        self.stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("no diagnostic output")
    }
}

/// Runs the engine against one keyring home directory.
///
/// Every invocation gets `--homedir <home> --batch --no-tty` so it never
/// touches the operator's personal keyring or waits on a terminal.
#[derive(Debug, Clone)]
pub struct GpgCommand {
    binary: PathBuf,
    homedir: PathBuf,
    timeout: Duration,
    max_output_size: usize,
}

impl GpgCommand {
    /// Create a runner for `binary` using the keyring in `homedir`.
    pub fn new(binary: impl Into<PathBuf>, homedir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            homedir: homedir.into(),
            timeout: Duration::from_secs(30),
            max_output_size: DEFAULT_MAX_OUTPUT,
        }
    }

    /// Set the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set maximum captured output size.
    pub fn with_max_output_size(mut self, size: usize) -> Self {
        self.max_output_size = size;
        self
    }

    /// Keyring home directory.
    pub fn homedir(&self) -> &Path {
        &self.homedir
    }

    /// Run the engine with `args`, feeding `stdin` if given.
    ///
    /// A process that outlives the timeout is killed and reported as
    /// [`GpgError::Timeout`]. A non-zero exit is returned as output, not as
    /// an error; callers decide what a failure means for their operation.
    pub async fn run(&self, args: &[String], stdin: Option<Vec<u8>>) -> Result<GpgOutput> {
        let start = Instant::now();

        match timeout(self.timeout, self.spawn_and_collect(args, stdin)).await {
            Ok(Ok(mut output)) => {
                output.duration_ms = start.elapsed().as_millis() as u64;
                debug!(
                    exit_code = output.exit_code,
                    duration_ms = output.duration_ms,
                    "gpg finished"
                );
                Ok(output)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "gpg timed out");
                Err(GpgError::Timeout(self.timeout.as_secs()))
            }
        }
    }

    async fn spawn_and_collect(&self, args: &[String], stdin: Option<Vec<u8>>) -> Result<GpgOutput> {
        debug!(binary = %self.binary.display(), ?args, "running gpg");

        let mut cmd = Command::new(&self.binary);
        cmd.arg("--homedir")
            .arg(&self.homedir)
            .args(["--batch", "--no-tty"])
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            GpgError::execution_failed(format!(
                "failed to spawn {}: {}",
                self.binary.display(),
                e
            ))
        })?;

        // Feed stdin concurrently with draining the pipes so large payloads
        // cannot deadlock against a full stdout buffer.
        let writer = match (child.stdin.take(), stdin) {
            (Some(mut pipe), Some(input)) => Some(tokio::spawn(async move {
                let result = pipe.write_all(&input).await;
                drop(pipe);
                result
            })),
            _ => None,
        };

        let (stdout, stderr) = tokio::join!(
            read_stream(child.stdout.take(), self.max_output_size),
            read_stream(child.stderr.take(), self.max_output_size),
        );

        let status = child.wait().await.map_err(|e| {
            GpgError::execution_failed(format!("failed to wait for gpg: {}", e))
        })?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The engine may exit before consuming all input; its exit
                // status is the authoritative result.
                Ok(Err(e)) => debug!("gpg stdin closed early: {}", e),
                Err(e) => warn!("gpg stdin writer panicked: {}", e),
            }
        }

        Ok(GpgOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            duration_ms: 0, // Set by caller
        })
    }
}

/// Read an async stream to the end, keeping at most `max_size` bytes.
async fn read_stream(handle: Option<impl AsyncRead + Unpin>, max_size: usize) -> Vec<u8> {
    let Some(mut handle) = handle else {
        return Vec::new();
    };

    let mut output = Vec::new();
    let mut buf = [0u8; 8192];

    loop {
        match handle.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                // Keep draining past the cap so the child never blocks on a full pipe
                let room = max_size.saturating_sub(output.len());
                output.extend_from_slice(&buf[..n.min(room)]);
            }
            Err(e) => {
                warn!("Error reading gpg stream: {}", e);
                break;
            }
        }
    }

    output
}
