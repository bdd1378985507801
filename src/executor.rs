//! Process execution layer
//!
//! A single narrow capability: spawn one process with a working directory,
//! feed it stdin, capture stdout/stderr independently, and enforce a hard
//! wall-clock deadline. The judge pipeline depends only on the
//! [`ProcessExecutor`] trait so tests can substitute a scripted fake.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::debug;

/// One process invocation
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// Argv; the program path comes first and must already be resolved
    pub command: Vec<String>,
    /// Working directory for the child
    pub work_dir: PathBuf,
    /// Text written to the child's stdin before it is closed
    pub stdin: Option<String>,
    /// Hard wall-clock deadline
    pub timeout: Duration,
}

/// How the process ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessStatus {
    /// Exited on its own with the given code (-1 when killed by a signal)
    Exited(i32),
    /// Deadline hit; the process group was killed
    TimedOut,
}

/// Captured result of one process invocation
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ProcessStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn is_clean_exit(&self) -> bool {
        self.status == ProcessStatus::Exited(0)
    }
}

/// Process-spawning capability injected into the runner
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    async fn execute(&self, req: &ProcessRequest) -> Result<ProcessOutput>;
}

/// Production executor backed by `tokio::process`.
///
/// Children are placed in their own process group so a timeout can take down
/// the whole tree (compilers and runtimes that fork workers would otherwise
/// leave orphans).
#[derive(Debug, Default)]
pub struct TokioExecutor;

impl TokioExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessExecutor for TokioExecutor {
    async fn execute(&self, req: &ProcessRequest) -> Result<ProcessOutput> {
        let (program, args) = req
            .command
            .split_first()
            .context("empty command for process execution")?;

        debug!(%program, ?args, work_dir = %req.work_dir.display(), "spawning process");

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&req.work_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {}", program))?;

        let pid = child.id().map(|id| Pid::from_raw(id as i32));

        // Drain the pipes concurrently with the wait so a chatty child
        // cannot deadlock on a full pipe buffer.
        let mut stdout_pipe = child.stdout.take().context("child stdout not captured")?;
        let mut stderr_pipe = child.stderr.take().context("child stderr not captured")?;
        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stdout_pipe.read_to_end(&mut buf).await;
            buf
        });
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr_pipe.read_to_end(&mut buf).await;
            buf
        });

        // The stdin feed must sit under the same deadline as the wait: a
        // child that never reads its input stalls write_all once the pipe
        // buffer fills, and that stall counts against the time limit too.
        let mut stdin_pipe = child.stdin.take();
        let wait_with_stdin = async {
            if let Some(mut stdin) = stdin_pipe.take() {
                if let Some(input) = &req.stdin {
                    // A child that exits without reading its input closes
                    // the pipe; that is not our error to report.
                    let _ = stdin.write_all(input.as_bytes()).await;
                }
                let _ = stdin.shutdown().await;
            }
            child.wait().await
        };

        let status = match tokio::time::timeout(req.timeout, wait_with_stdin).await {
            Ok(wait_result) => {
                let status = wait_result.context("failed to wait for child")?;
                ProcessStatus::Exited(status.code().unwrap_or(-1))
            }
            Err(_) => {
                debug!(%program, timeout_ms = req.timeout.as_millis() as u64, "deadline hit, killing process group");
                if let Some(pid) = pid {
                    // The child leads its own group; SIGKILL the whole tree.
                    let _ = killpg(pid, Signal::SIGKILL);
                }
                // Reap after the kill; bounded because SIGKILL is not maskable.
                let _ = child.wait().await;
                ProcessStatus::TimedOut
            }
        };

        let stdout = String::from_utf8_lossy(&stdout_task.await.unwrap_or_default()).to_string();
        let stderr = String::from_utf8_lossy(&stderr_task.await.unwrap_or_default()).to_string();

        Ok(ProcessOutput {
            status,
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted executor for deterministic pipeline tests

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed sequence of outputs and records every request.
    pub(crate) struct ScriptedExecutor {
        script: Mutex<VecDeque<ProcessOutput>>,
        pub(crate) requests: Mutex<Vec<ProcessRequest>>,
    }

    impl ScriptedExecutor {
        pub(crate) fn new(outputs: Vec<ProcessOutput>) -> Self {
            Self {
                script: Mutex::new(outputs.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ProcessExecutor for ScriptedExecutor {
        async fn execute(&self, req: &ProcessRequest) -> Result<ProcessOutput> {
            self.requests.lock().unwrap().push(req.clone());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .context("scripted executor ran out of outputs")
        }
    }

    pub(crate) fn exited(code: i32, stdout: &str, stderr: &str) -> ProcessOutput {
        ProcessOutput {
            status: ProcessStatus::Exited(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    pub(crate) fn timed_out() -> ProcessOutput {
        ProcessOutput {
            status: ProcessStatus::TimedOut,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_captures_streams_separately() {
        let dir = tempfile::tempdir().unwrap();
        let req = ProcessRequest {
            command: vec![
                "sh".into(),
                "-c".into(),
                "echo out; echo err 1>&2".into(),
            ],
            work_dir: dir.path().to_path_buf(),
            stdin: None,
            timeout: Duration::from_secs(5),
        };
        let out = TokioExecutor::new().execute(&req).await.unwrap();
        assert_eq!(out.status, ProcessStatus::Exited(0));
        assert_eq!(out.stdout, "out\n");
        assert_eq!(out.stderr, "err\n");
    }

    #[tokio::test]
    async fn test_feeds_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let req = ProcessRequest {
            command: vec!["cat".into()],
            work_dir: dir.path().to_path_buf(),
            stdin: Some("hello".into()),
            timeout: Duration::from_secs(5),
        };
        let out = TokioExecutor::new().execute(&req).await.unwrap();
        assert!(out.is_clean_exit());
        assert_eq!(out.stdout, "hello");
    }

    #[tokio::test]
    async fn test_nonzero_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let req = ProcessRequest {
            command: vec!["sh".into(), "-c".into(), "exit 3".into()],
            work_dir: dir.path().to_path_buf(),
            stdin: None,
            timeout: Duration::from_secs(5),
        };
        let out = TokioExecutor::new().execute(&req).await.unwrap();
        assert_eq!(out.status, ProcessStatus::Exited(3));
    }

    #[tokio::test]
    async fn test_timeout_kills_hung_process() {
        let dir = tempfile::tempdir().unwrap();
        let req = ProcessRequest {
            command: vec!["sleep".into(), "30".into()],
            work_dir: dir.path().to_path_buf(),
            stdin: None,
            timeout: Duration::from_millis(200),
        };
        let started = Instant::now();
        let out = TokioExecutor::new().execute(&req).await.unwrap();
        assert_eq!(out.status, ProcessStatus::TimedOut);
        // Kill and reap must not wait for the child's own 30s sleep
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_timeout_applies_while_feeding_stdin() {
        // A child that never reads its input stalls the stdin write once
        // the pipe buffer fills; the deadline must still hold.
        let dir = tempfile::tempdir().unwrap();
        let req = ProcessRequest {
            command: vec!["sleep".into(), "30".into()],
            work_dir: dir.path().to_path_buf(),
            stdin: Some("x".repeat(1024 * 1024)),
            timeout: Duration::from_millis(300),
        };
        let started = Instant::now();
        let out = TokioExecutor::new().execute(&req).await.unwrap();
        assert_eq!(out.status, ProcessStatus::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let req = ProcessRequest {
            command: vec!["/no/such/binary".into()],
            work_dir: dir.path().to_path_buf(),
            stdin: None,
            timeout: Duration::from_secs(1),
        };
        assert!(TokioExecutor::new().execute(&req).await.is_err());
    }
}
