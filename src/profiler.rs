//! External profiler invocation.
//!
//! The profiler executable is started with a backend configuration, reads the
//! input tokens from stdin (one per line) and writes a JSON profile to stdout.
//! Its stderr is forwarded to the log.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::error::ProfilerError;
use crate::model::{InputToken, Profile};

/// Maximum amount of stderr kept for error reports (4KB).
const MAX_STDERR_TAIL: usize = 4 * 1024;

/// Runs one profiling computation.
///
/// Implementations must stop their work when the returned future is dropped;
/// this is how the job runner enforces its deadline.
#[async_trait]
pub trait Profiler: Send + Sync {
    async fn profile(
        &self,
        config: &Path,
        tokens: &[InputToken],
    ) -> Result<Profile, ProfilerError>;
}

/// Profiler backed by an external executable.
#[derive(Debug, Clone)]
pub struct ExecProfiler {
    executable: PathBuf,
}

impl ExecProfiler {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    fn command(&self, config: &Path) -> Command {
        let mut command = Command::new(&self.executable);
        command
            .arg("--config")
            .arg(config)
            .args([
                "--sourceFormat",
                "EXT",
                "--sourceFile",
                "/dev/stdin",
                "--jsonOutput",
                "/dev/stdout",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Profiler for ExecProfiler {
    async fn profile(
        &self,
        config: &Path,
        tokens: &[InputToken],
    ) -> Result<Profile, ProfilerError> {
        let mut child = self
            .command(config)
            .spawn()
            .map_err(|e| ProfilerError::Spawn {
                executable: self.executable.display().to_string(),
                reason: e.to_string(),
            })?;

        let (Some(mut stdin), Some(mut stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(std::io::Error::other("profiler pipes were not captured").into());
        };

        let input = render_input(tokens);
        let write = async move {
            match stdin.write_all(input.as_bytes()).await {
                // The profiler may exit before consuming its input; its exit status decides.
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
            // stdin is dropped here, closing the pipe.
        };
        let read = async {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(buf)
        };
        let log = async {
            // Profilers may emit legacy encodings on stderr; decode lossily.
            let mut lines = BufReader::new(stderr).split(b'\n');
            let mut tail = String::new();
            while let Some(raw) = lines.next_segment().await? {
                let line = String::from_utf8_lossy(&raw);
                let line = line.trim_end_matches('\r');
                debug!(executable = %self.executable.display(), "{}", line);
                push_tail(&mut tail, line);
            }
            Ok::<_, std::io::Error>(tail)
        };

        let ((), output, stderr_tail) = tokio::try_join!(write, read, log)?;
        let status = child.wait().await?;

        if !status.success() {
            return Err(ProfilerError::Failed {
                status: status.code().unwrap_or(-1),
                stderr: stderr_tail,
            });
        }

        debug!(
            tokens = tokens.len(),
            config = %config.display(),
            bytes = output.len(),
            "Profiler finished"
        );
        Ok(Profile(serde_json::from_slice(&output)?))
    }
}

/// One token per line, newline terminated.
fn render_input(tokens: &[InputToken]) -> String {
    let mut input = String::with_capacity(tokens.iter().map(|t| t.0.len() + 1).sum());
    for token in tokens {
        input.push_str(&token.0);
        input.push('\n');
    }
    input
}

/// Append a line to `tail`, keeping only the last `MAX_STDERR_TAIL` bytes.
fn push_tail(tail: &mut String, line: &str) {
    if !tail.is_empty() {
        tail.push('\n');
    }
    tail.push_str(line);
    if tail.len() > MAX_STDERR_TAIL {
        let mut cut = tail.len() - MAX_STDERR_TAIL;
        while !tail.is_char_boundary(cut) {
            cut += 1;
        }
        tail.drain(..cut);
    }
}
