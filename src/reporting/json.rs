//! # JSON Reporting Module / JSON 报告模块
//!
//! Machine-readable report for CI systems. Captured output is rendered as
//! lossy UTF-8 text.
//!
//! 面向 CI 系统的机器可读报告。捕获的输出以有损 UTF-8 文本呈现。

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;

use crate::core::models::{EvaluationResult, FailedCheck, Outcome, SuiteReport};
use crate::infra::fs;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    binary: String,
    started_at: DateTime<Local>,
    duration_ms: u128,
    total: usize,
    passed: usize,
    failed: usize,
    results: Vec<JsonResult<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonResult<'a> {
    name: &'a str,
    outcome: &'a Outcome,
    passed: bool,
    exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal: Option<i32>,
    stdout: String,
    stderr: String,
    stdout_dropped: usize,
    stderr_dropped: usize,
    failed_checks: &'a [FailedCheck],
    duration_ms: u128,
}

impl<'a> From<&'a EvaluationResult> for JsonResult<'a> {
    fn from(result: &'a EvaluationResult) -> Self {
        Self {
            name: &result.name,
            outcome: &result.outcome,
            passed: result.passed(),
            exit_code: result.exit_code,
            signal: result.signal,
            stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            stdout_dropped: result.stdout_dropped,
            stderr_dropped: result.stderr_dropped,
            failed_checks: &result.failed_checks,
            duration_ms: result.duration.as_millis(),
        }
    }
}

/// Serializes the report as pretty-printed JSON.
pub fn render_json_report(report: &SuiteReport) -> Result<String> {
    let json = JsonReport {
        binary: report.binary.display().to_string(),
        started_at: report.started_at,
        duration_ms: report.duration.as_millis(),
        total: report.total(),
        passed: report.passed_count(),
        failed: report.failed_count(),
        results: report.results.iter().map(JsonResult::from).collect(),
    };
    serde_json::to_string_pretty(&json).context("Failed to serialize the JSON report")
}

/// Renders the report and writes it to `output_path`.
pub fn write_json_report(report: &SuiteReport, output_path: &Path) -> Result<()> {
    fs::write_report(output_path, &render_json_report(report)?)
}
