//! Judging of submissions against test-case suites
//!
//! Two aggregation policies coexist on purpose and callers pick one:
//!
//! - [`Judge::evaluate_suite`] runs every case and awards partial credit
//!   (contest grading);
//! - [`Judge::evaluate_fail_fast`] stops at the first failing case and
//!   reports it with score 0 (practice-mode feedback).
//!
//! Both judge cases in stored order, never retry a case, and return an
//! immutable judgement.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, trace};

use crate::config::JudgeConfig;
use crate::executor::ProcessExecutor;
use crate::languages::Language;
use crate::runner::{RunRequest, Runner};
use crate::verdict::{Judgement, Outcome, Verdict};

/// One test case from a problem's stored collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
}

/// Why a stored test-case collection could not be used
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("Invalid test case format")]
    Parse(#[from] serde_json::Error),
    #[error("No test cases found")]
    Empty,
}

/// Parse a stored JSON test-case collection. Missing `input`/`output` fields
/// default to empty text; a missing or blank collection counts as empty.
pub fn parse_test_suite(raw: Option<&str>) -> Result<Vec<TestCase>, SuiteError> {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => "[]",
    };
    let cases: Vec<TestCase> = serde_json::from_str(raw)?;
    if cases.is_empty() {
        return Err(SuiteError::Empty);
    }
    Ok(cases)
}

/// Pick the pair for a single-case run: the problem's designated sample when
/// both halves are present, otherwise the first stored test case.
pub fn sample_case(
    sample_input: Option<&str>,
    sample_output: Option<&str>,
    suite: &[TestCase],
) -> Option<TestCase> {
    let input = sample_input.map(str::trim).unwrap_or_default();
    let output = sample_output.map(str::trim).unwrap_or_default();
    if !input.is_empty() && !output.is_empty() {
        return Some(TestCase {
            input: input.to_string(),
            output: output.to_string(),
        });
    }
    suite.first().cloned()
}

/// The evaluator: owns a [`Runner`] and aggregates per-case outcomes.
pub struct Judge {
    runner: Runner,
}

impl Judge {
    pub fn new(executor: Arc<dyn ProcessExecutor>, config: JudgeConfig) -> Self {
        Self {
            runner: Runner::new(executor, config),
        }
    }

    /// Build a judge around a preconfigured runner (custom resolver, tests).
    pub fn with_runner(runner: Runner) -> Self {
        Self { runner }
    }

    /// Evaluate exactly one `{input, expected}` pair and return the outcome
    /// unmodified (the interactive "try it" action).
    pub async fn run_sample(
        &self,
        language: &str,
        code: &str,
        stdin: &str,
        expected_output: &str,
    ) -> Outcome {
        let case = TestCase {
            input: stdin.to_string(),
            output: expected_output.to_string(),
        };
        self.run_case(language, code, &case).await
    }

    /// Evaluate every case in stored order and award partial credit:
    /// accepted/100 only when all pass, otherwise wrong-answer with
    /// score = floor(100 * passed / total) and the last failing case's
    /// output/error as diagnostic.
    pub async fn evaluate_suite(&self, language: &str, code: &str, cases: &[TestCase]) -> Judgement {
        if cases.is_empty() {
            return Judgement::internal_error(SuiteError::Empty.to_string());
        }

        let total = cases.len();
        let mut passed = 0usize;
        let mut last_output = None;
        let mut last_error = None;

        for (idx, case) in cases.iter().enumerate() {
            let outcome = self.run_case(language, code, case).await;
            trace!(case = idx + 1, verdict = %outcome.verdict, "case judged");

            if outcome.is_accepted() {
                passed += 1;
            } else {
                last_output = outcome.output;
                last_error = outcome.error;
            }
        }

        let judgement = if passed == total {
            Judgement {
                verdict: Verdict::Accepted,
                score: 100,
                output: None,
                error: None,
                passed,
                total,
            }
        } else {
            Judgement {
                verdict: Verdict::WrongAnswer,
                score: ((passed * 100) / total) as u8,
                output: last_output,
                error: last_error,
                passed,
                total,
            }
        };

        info!(
            verdict = %judgement.verdict,
            score = judgement.score,
            passed = judgement.passed,
            total = judgement.total,
            "suite evaluated"
        );
        judgement
    }

    /// Evaluate cases in stored order and stop at the first failure,
    /// reporting that case's verdict with score 0 and a diagnostic naming
    /// the 1-based failing case.
    pub async fn evaluate_fail_fast(
        &self,
        language: &str,
        code: &str,
        cases: &[TestCase],
    ) -> Judgement {
        if cases.is_empty() {
            return Judgement::internal_error(SuiteError::Empty.to_string());
        }

        let total = cases.len();
        for (idx, case) in cases.iter().enumerate() {
            // This path trims each pair at the edges before executing, so
            // stdin and the diagnostic never carry stray edge whitespace.
            let case = TestCase {
                input: case.input.trim().to_string(),
                output: case.output.trim().to_string(),
            };
            let outcome = self.run_case(language, code, &case).await;
            trace!(case = idx + 1, verdict = %outcome.verdict, "case judged");

            if !outcome.is_accepted() {
                let actual = match outcome.output.as_deref() {
                    Some(out) if !out.is_empty() => out.to_string(),
                    _ => outcome.error.clone().unwrap_or_default(),
                };
                let diagnostic = format!(
                    "Failed on test case {}:\nInput: '{}'\nExpected: '{}'\nActual: '{}'\nVerdict: {}",
                    idx + 1,
                    case.input,
                    case.output,
                    actual,
                    outcome.verdict
                );
                info!(verdict = %outcome.verdict, failed_case = idx + 1, "submission rejected");
                return Judgement {
                    verdict: outcome.verdict,
                    score: 0,
                    output: outcome.output,
                    error: Some(diagnostic),
                    passed: idx,
                    total,
                };
            }
        }

        info!(total, "all test cases passed");
        Judgement {
            verdict: Verdict::Accepted,
            score: 100,
            output: None,
            error: None,
            passed: total,
            total,
        }
    }

    /// Partial-credit evaluation straight from the stored JSON collection.
    /// Missing, empty or unparseable collections are an internal error with
    /// score 0, without spawning any process.
    pub async fn evaluate_stored(
        &self,
        language: &str,
        code: &str,
        raw_suite: Option<&str>,
    ) -> Judgement {
        match parse_test_suite(raw_suite) {
            Ok(cases) => self.evaluate_suite(language, code, &cases).await,
            Err(err) => Judgement::internal_error(err.to_string()),
        }
    }

    /// Fail-fast evaluation straight from the stored JSON collection.
    pub async fn evaluate_stored_fail_fast(
        &self,
        language: &str,
        code: &str,
        raw_suite: Option<&str>,
    ) -> Judgement {
        match parse_test_suite(raw_suite) {
            Ok(cases) => self.evaluate_fail_fast(language, code, &cases).await,
            Err(err) => Judgement::internal_error(err.to_string()),
        }
    }

    /// Run one case, mapping an unsupported language name to a compile
    /// error instead of a crash.
    async fn run_case(&self, language: &str, code: &str, case: &TestCase) -> Outcome {
        let Some(language) = Language::from_name(language) else {
            return Outcome::compile_error(format!("Unsupported language: {}", language));
        };
        self.runner
            .execute(&RunRequest {
                language,
                code: code.to_string(),
                stdin: case.input.clone(),
                expected_output: case.output.clone(),
            })
            .await
    }
}
