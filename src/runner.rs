//! Sandboxed runner
//!
//! One invocation is one full process lifecycle for one test case: create an
//! ephemeral work directory, write the source under the backend's required
//! filename, build if the language needs it, run with stdin piped in, then
//! classify the result. Every per-process failure is converted into a typed
//! [`Outcome`] here; nothing escapes to the judge as an unhandled fault.
//!
//! Invocations share no mutable state. Each gets a uniquely named temp
//! directory which is removed on every exit path, including orchestration
//! errors, via `TempDir`'s drop.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::compare::{mismatch_diagnostic, normalize, outputs_match};
use crate::config::JudgeConfig;
use crate::executor::{ProcessExecutor, ProcessRequest, ProcessStatus};
use crate::languages::{self, Backend, Language};
use crate::toolchain;
use crate::verdict::{Outcome, Verdict};

/// Build output filename for compiled-native backends (the `{exe}` placeholder)
const BUILD_OUTPUT_NAME: &str = "main.out";

/// Resolves toolchain names to absolute paths. Overridable so pipeline tests
/// run without any toolchain on the host.
pub type ResolverFn = fn(&[&str]) -> Option<PathBuf>;

/// One execution request: a single source + stdin + expected-output triple.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub language: Language,
    pub code: String,
    pub stdin: String,
    pub expected_output: String,
}

/// Runs one submission against one test case under the configured limits.
pub struct Runner {
    executor: Arc<dyn ProcessExecutor>,
    config: JudgeConfig,
    resolver: ResolverFn,
}

impl Runner {
    pub fn new(executor: Arc<dyn ProcessExecutor>, config: JudgeConfig) -> Self {
        Self {
            executor,
            config,
            resolver: toolchain::resolve_any,
        }
    }

    /// Substitute the toolchain lookup (tests)
    pub fn with_resolver(mut self, resolver: ResolverFn) -> Self {
        self.resolver = resolver;
        self
    }

    /// Execute one request end to end and classify the result.
    pub async fn execute(&self, req: &RunRequest) -> Outcome {
        match self.try_execute(req).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %format!("{err:#}"), "judging pipeline failure");
                Outcome::internal_error(format!("judging pipeline failure: {err:#}"))
            }
        }
    }

    async fn try_execute(&self, req: &RunRequest) -> Result<Outcome> {
        let Some(backend) = languages::backend_for(req.language) else {
            return Ok(Outcome::compile_error(format!(
                "Unsupported language: {}",
                req.language.key()
            )));
        };

        let work_dir = tempfile::tempdir().context("failed to create work directory")?;
        debug!(work_dir = %work_dir.path().display(), language = req.language.key(), "created work directory");

        let src = work_dir.path().join(&backend.source_file);
        let exe = work_dir.path().join(BUILD_OUTPUT_NAME);
        tokio::fs::write(&src, &req.code)
            .await
            .context("failed to write source file")?;

        if let Some(compile_tokens) = &backend.compile_command {
            let command =
                languages::expand_command(compile_tokens, &src, &exe, work_dir.path());
            let command = match self.resolve_program(command, &backend) {
                Ok(command) => command,
                Err(outcome) => return Ok(outcome),
            };

            debug!(?command, "compiling");
            let build = self
                .executor
                .execute(&ProcessRequest {
                    command,
                    work_dir: work_dir.path().to_path_buf(),
                    stdin: None,
                    timeout: self.config.compile_timeout(),
                })
                .await
                .context("build step failed to start")?;

            match build.status {
                ProcessStatus::TimedOut => {
                    return Ok(Outcome::compile_error(format!(
                        "Compilation timed out ({} seconds)",
                        self.config.compile_timeout().as_secs()
                    )));
                }
                ProcessStatus::Exited(0) => {}
                ProcessStatus::Exited(_) => {
                    let message = if build.stderr.trim().is_empty() {
                        "Compilation failed".to_string()
                    } else {
                        build.stderr
                    };
                    debug!("compilation failed");
                    return Ok(Outcome::compile_error(message));
                }
            }
        }

        let command = languages::expand_command(&backend.run_command, &src, &exe, work_dir.path());
        let command = match self.resolve_program(command, &backend) {
            Ok(command) => command,
            Err(outcome) => return Ok(outcome),
        };

        debug!(?command, "running");
        let run = self
            .executor
            .execute(&ProcessRequest {
                command,
                work_dir: work_dir.path().to_path_buf(),
                stdin: Some(req.stdin.clone()),
                timeout: self.config.run_timeout(),
            })
            .await
            .context("run step failed to start")?;

        let outcome = match run.status {
            ProcessStatus::TimedOut => {
                // Partial output from a killed process is not trusted
                Outcome {
                    verdict: Verdict::TimeLimitExceeded,
                    output: None,
                    error: Some(format!(
                        "Time Limit Exceeded ({} seconds)",
                        self.config.run_timeout().as_secs()
                    )),
                }
            }
            ProcessStatus::Exited(code) if code != 0 || !run.stderr.trim().is_empty() => {
                let message = if run.stderr.trim().is_empty() {
                    format!("Process exited with code {}", code)
                } else {
                    run.stderr.trim().to_string()
                };
                Outcome {
                    verdict: Verdict::RuntimeError,
                    output: Some(run.stdout.trim().to_string()),
                    error: Some(message),
                }
            }
            ProcessStatus::Exited(_) => {
                if outputs_match(&run.stdout, &req.expected_output) {
                    Outcome::accepted(normalize(&run.stdout))
                } else {
                    Outcome {
                        verdict: Verdict::WrongAnswer,
                        output: Some(normalize(&run.stdout)),
                        error: Some(mismatch_diagnostic(&run.stdout, &req.expected_output)),
                    }
                }
            }
        };

        debug!(verdict = %outcome.verdict, "case judged");
        Ok(outcome)
    }

    /// Resolve the program token of an expanded command. Tokens containing a
    /// path separator already point into the work directory (e.g. the build
    /// output) and are used as-is; bare names go through the toolchain
    /// resolver, trying `|`-separated alternatives in order. A miss becomes a
    /// compile-error outcome naming the tool and its install hint.
    fn resolve_program(
        &self,
        mut command: Vec<String>,
        backend: &Backend,
    ) -> std::result::Result<Vec<String>, Outcome> {
        let Some(program) = command.first().cloned() else {
            return Err(Outcome::internal_error("empty command template"));
        };

        if program.contains('/') {
            return Ok(command);
        }

        let alternatives: Vec<&str> = program.split('|').collect();
        match (self.resolver)(&alternatives) {
            Some(path) => {
                command[0] = path.to_string_lossy().into_owned();
                Ok(command)
            }
            None => {
                let tool = alternatives[0];
                let message = match &backend.install_hint {
                    Some(hint) => {
                        format!("{} not found. Please install: {}", tool, hint)
                    }
                    None => format!("{} not found", tool),
                };
                Err(Outcome::compile_error(message))
            }
        }
    }
}
