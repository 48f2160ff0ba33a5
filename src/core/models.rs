//! # Data Models Module / 数据模型模块
//!
//! Result types produced by the evaluator and consumed by the reporters.
//!
//! 由评估器产生、由报告器消费的结果类型。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::infra::t;

/// Exit code reported for a process terminated by a signal.
/// 进程被信号终止时报告的退出码。
pub const SIGNAL_EXIT_CODE: i32 = -1;

/// Exit code reported when the program image could not be executed.
/// 无法执行程序映像时报告的退出码。
pub const EXEC_FAILURE_EXIT_CODE: i32 = 127;

/// The final state of one test.
/// 单个测试的最终状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// All three validators accepted.
    Passed,
    /// The process finished but at least one validator rejected.
    Failed,
    /// The per-test deadline expired and the process group was killed.
    TimedOut { after: Duration },
    /// The run was interrupted before this test finished.
    Cancelled,
    /// The program could not be executed at all.
    LaunchFailed { error: String },
}

/// The three checks applied to every test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    Stdout,
    Stderr,
    ExitCode,
}

impl Check {
    pub fn label(&self, locale: &str) -> String {
        match self {
            Check::Stdout => t!("report.stdout", locale = locale).to_string(),
            Check::Stderr => t!("report.stderr", locale = locale).to_string(),
            Check::ExitCode => t!("report.exit_code", locale = locale).to_string(),
        }
    }
}

/// A rejected check with what was expected and what was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedCheck {
    pub check: Check,
    /// `None` when the validator is an undescribed custom predicate.
    pub expected: Option<String>,
    pub actual: String,
}

/// Everything known about one test once it has been evaluated.
/// 单个测试评估完成后的全部信息。
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    pub name: String,
    pub outcome: Outcome,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Bytes dropped because the stdout buffer was full.
    pub stdout_dropped: usize,
    pub stderr_dropped: usize,
    /// Exit code, [`SIGNAL_EXIT_CODE`] on signal death, [`EXEC_FAILURE_EXIT_CODE`] on exec failure.
    pub exit_code: i32,
    pub signal: Option<i32>,
    pub failed_checks: Vec<FailedCheck>,
    pub duration: Duration,
}

impl EvaluationResult {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.outcome, Outcome::TimedOut { .. })
    }

    pub fn stdout_truncated(&self) -> bool {
        self.stdout_dropped > 0
    }

    pub fn stderr_truncated(&self) -> bool {
        self.stderr_dropped > 0
    }

    pub fn failed_check(&self, check: Check) -> Option<&FailedCheck> {
        self.failed_checks.iter().find(|f| f.check == check)
    }

    /// Gets the status of the result as a localized string for display.
    /// 以本地化字符串形式获取结果状态以供显示。
    pub fn status_str(&self, locale: &str) -> String {
        match &self.outcome {
            Outcome::Passed => t!("report.status_passed", locale = locale).to_string(),
            Outcome::Failed => t!("report.status_failed", locale = locale).to_string(),
            Outcome::TimedOut { .. } => t!("report.status_timeout", locale = locale).to_string(),
            Outcome::Cancelled => t!("report.status_cancelled", locale = locale).to_string(),
            Outcome::LaunchFailed { .. } => {
                t!("report.status_launch_failed", locale = locale).to_string()
            }
        }
    }

    /// CSS class used by the HTML report.
    pub fn status_class(&self) -> &'static str {
        match self.outcome {
            Outcome::Passed => "status-passed",
            Outcome::Failed => "status-failed",
            Outcome::TimedOut { .. } => "status-timeout",
            Outcome::Cancelled => "status-cancelled",
            Outcome::LaunchFailed { .. } => "status-launch-failed",
        }
    }
}

/// The outcome of one full suite invocation.
/// 一次完整测试套件调用的结果。
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub binary: PathBuf,
    pub started_at: DateTime<Local>,
    pub duration: Duration,
    /// One entry per test case, in the order the cases were given.
    pub results: Vec<EvaluationResult>,
}

impl SuiteReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total() - self.passed_count()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(EvaluationResult::passed)
    }

    pub fn get(&self, name: &str) -> Option<&EvaluationResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// Renders bytes as a quoted, escaped string: `42\n` becomes `"42\n"`.
pub fn display_bytes(bytes: &[u8]) -> String {
    format!("\"{}\"", String::from_utf8_lossy(bytes).escape_debug())
}
