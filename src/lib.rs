//! Execution-and-judging engine for untrusted code submissions.
//!
//! The application layer (HTTP, persistence, auth) supplies
//! `(language, source code, stdin, expected stdout)` and consumes
//! `(verdict, output/error, score)` through the in-process [`Judge`] API:
//!
//! ```no_run
//! use std::sync::Arc;
//! use judge_core::{Judge, JudgeConfig, TokioExecutor, TestCase};
//!
//! # async fn demo() {
//! let judge = Judge::new(Arc::new(TokioExecutor::new()), JudgeConfig::default());
//! let suite = vec![TestCase { input: "X".into(), output: "X".into() }];
//! let judgement = judge.evaluate_suite("python", "print(input())", &suite).await;
//! assert_eq!(judgement.score, 100);
//! # }
//! ```

pub mod compare;
pub mod config;
pub mod executor;
pub mod judge;
pub mod languages;
pub mod runner;
pub mod toolchain;
pub mod verdict;

pub use config::JudgeConfig;
pub use executor::{ProcessExecutor, ProcessOutput, ProcessRequest, ProcessStatus, TokioExecutor};
pub use judge::{parse_test_suite, sample_case, Judge, SuiteError, TestCase};
pub use languages::{Backend, Language};
pub use runner::{RunRequest, Runner};
pub use verdict::{Judgement, Outcome, Verdict};
