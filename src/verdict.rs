use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict from judging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    RuntimeError,
    CompileError,
    InternalError,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Accepted => "accepted",
            Verdict::WrongAnswer => "wrong_answer",
            Verdict::TimeLimitExceeded => "time_limit_exceeded",
            Verdict::RuntimeError => "runtime_error",
            Verdict::CompileError => "compile_error",
            Verdict::InternalError => "internal_error",
        };
        write!(f, "{}", s)
    }
}

/// Result of one run invocation: one process lifecycle against one test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub verdict: Verdict,
    /// Captured stdout, trimmed (empty runs omit it)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Diagnostic text: compiler stderr, runtime stderr, expected-vs-got, or
    /// a fixed timeout message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    pub fn accepted(output: String) -> Self {
        Self {
            verdict: Verdict::Accepted,
            output: Some(output),
            error: None,
        }
    }

    pub fn compile_error(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::CompileError,
            output: None,
            error: Some(message.into()),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::InternalError,
            output: None,
            error: Some(message.into()),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accepted
    }
}

/// Aggregated result of evaluating a submission against a whole test suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judgement {
    pub verdict: Verdict,
    /// Integer score in [0, 100]; 100 exactly when verdict is accepted
    pub score: u8,
    /// Output of the last non-passing case (or last case when accepted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Diagnostic of the last non-passing case
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub passed: usize,
    pub total: usize,
}

impl Judgement {
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::InternalError,
            score: 0,
            output: None,
            error: Some(message.into()),
            passed: 0,
            total: 0,
        }
    }
}
