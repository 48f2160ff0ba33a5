//! # Console Reporting Module / 控制台报告模块
//!
//! This module renders a [`SuiteReport`] as colored, human-readable text.
//! Rendering and printing are separate so the text can be tested directly.
//!
//! 此模块将 [`SuiteReport`] 渲染为彩色、易读的文本。
//! 渲染与打印分离，便于直接测试生成的文本。

use colored::*;
use std::fmt::Write;

use crate::core::models::{EvaluationResult, Outcome, SuiteReport};
use crate::infra::t;

const SEPARATOR_WIDTH: usize = 60;

/// Renders the full report: one block per test followed by a summary line.
///
/// 渲染完整报告：每个测试一个区块，最后是汇总行。
///
/// # Output Format / 输出格式
/// ```text
/// ------------------------------------------------------------
/// [FirstTest] PASSED (1.52ms)
/// [SecondTest] FAILED (1.31ms)
///   stderr:
///     - Expected: "42\n"
///     + Actual:   ""
/// ------------------------------------------------------------
/// Summary: 1 passed, 1 failed, 2 total (3.10ms)
/// ```
pub fn render_report(report: &SuiteReport, locale: &str) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{}", t!("report.banner", locale = locale).bold());
    let _ = writeln!(out, "{separator}");
    for result in &report.results {
        render_result(&mut out, result, locale);
    }
    let _ = writeln!(out, "{separator}");

    let summary = t!(
        "report.summary",
        locale = locale,
        passed = report.passed_count(),
        failed = report.failed_count(),
        total = report.total(),
        duration = format!("{:.2?}", report.duration)
    );
    let summary = if report.all_passed() {
        summary.green().bold()
    } else {
        summary.red().bold()
    };
    let _ = writeln!(out, "{summary}");
    out
}

fn render_result(out: &mut String, result: &EvaluationResult, locale: &str) {
    let status = result.status_str(locale);
    let status = match result.outcome {
        Outcome::Passed => status.green(),
        Outcome::Failed | Outcome::LaunchFailed { .. } => status.red(),
        Outcome::TimedOut { .. } => status.yellow(),
        Outcome::Cancelled => status.dimmed(),
    };
    let _ = writeln!(
        out,
        "[{}] {} ({:.2?})",
        result.name.cyan(),
        status.bold(),
        result.duration
    );

    match &result.outcome {
        Outcome::LaunchFailed { error } => {
            let _ = writeln!(
                out,
                "  {}",
                t!("report.launch_error", locale = locale, error = error)
            );
        }
        Outcome::TimedOut { after } => {
            let secs = format!("{:.2}", after.as_secs_f64());
            let _ = writeln!(
                out,
                "  {}",
                t!("report.timed_out_after", locale = locale, secs = secs)
            );
        }
        _ => {}
    }

    if let Some(signal) = result.signal {
        let _ = writeln!(out, "  {}", t!("report.signal", locale = locale, signal = signal));
    }

    for failure in &result.failed_checks {
        let expected = failure
            .expected
            .clone()
            .unwrap_or_else(|| t!("report.unspecified", locale = locale).to_string());
        let _ = writeln!(out, "  {}:", failure.check.label(locale));
        let _ = writeln!(
            out,
            "    {} {}",
            format!("- {}:", t!("report.expected", locale = locale)).green(),
            expected
        );
        let _ = writeln!(
            out,
            "    {} {}",
            format!("+ {}:", t!("report.actual", locale = locale)).red(),
            failure.actual
        );
    }

    for (label, dropped) in [
        (t!("report.stdout", locale = locale), result.stdout_dropped),
        (t!("report.stderr", locale = locale), result.stderr_dropped),
    ] {
        if dropped > 0 {
            let note = t!("report.truncated", locale = locale, stream = label, dropped = dropped);
            let _ = writeln!(out, "  {}", note.yellow());
        }
    }
}

/// Prints the rendered report to stdout.
///
/// 将渲染后的报告打印到标准输出。
pub fn print_report(report: &SuiteReport, locale: &str) {
    print!("{}", render_report(report, locale));
}
