//! # HTML Reporting Module / HTML 报告模块
//!
//! This module renders a self-contained HTML page for a suite run: summary
//! counters and a results table listing failed checks, notes and the
//! captured output of every test (collapsed by default).
//!
//! 此模块为一次套件运行生成独立的 HTML 页面：汇总计数和结果表格，
//! 列出每个测试未通过的检查、备注以及默认折叠的捕获输出。

use anyhow::Result;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::path::Path;

use crate::core::models::{EvaluationResult, Outcome, SuiteReport};
use crate::infra::{fs, t};

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2em; color: #24292e; }
h1 { border-bottom: 1px solid #e1e4e8; padding-bottom: .3em; }
.meta { color: #586069; margin-bottom: 1em; }
.summary-container { display: flex; gap: 1.5em; margin: 1em 0 2em; }
.summary-item { display: flex; flex-direction: column; align-items: center; padding: .8em 1.5em; border: 1px solid #e1e4e8; border-radius: 6px; }
.summary-item .count { font-size: 1.8em; font-weight: 600; }
.passed-text { color: #22863a; }
.failed-text { color: #cb2431; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: .5em .8em; border-bottom: 1px solid #e1e4e8; vertical-align: top; }
.status-cell { display: inline-block; padding: .1em .6em; border-radius: 4px; font-weight: 600; color: #fff; }
.status-passed { background: #28a745; }
.status-failed, .status-launch-failed { background: #d73a49; }
.status-timeout { background: #dbab09; }
.status-cancelled { background: #6a737d; }
details { margin-top: .4em; }
pre { background: #f6f8fa; padding: .6em; overflow-x: auto; white-space: pre-wrap; }
.expected { color: #22863a; }
.actual { color: #cb2431; }
"#;

/// Renders the report as a complete HTML document.
///
/// 将报告渲染为完整的 HTML 文档。
pub fn render_html_report(report: &SuiteReport, locale: &str) -> String {
    let markup = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", locale = locale)) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header", locale = locale)) }
                div.meta {
                    div { (t!("html_report.binary", locale = locale)) ": " code { (report.binary.display().to_string()) } }
                    div { (t!("html_report.started_at", locale = locale)) ": " (report.started_at.format("%Y-%m-%d %H:%M:%S").to_string()) }
                    div { (t!("html_report.duration", locale = locale)) ": " (format!("{:.2?}", report.duration)) }
                }
                div.summary-container {
                    div.summary-item {
                        span.count { (report.total()) }
                        span.label { (t!("html_report.summary_total", locale = locale)) }
                    }
                    div.summary-item {
                        span.count.passed-text { (report.passed_count()) }
                        span.label { (t!("html_report.summary_passed", locale = locale)) }
                    }
                    div.summary-item {
                        span.count.failed-text { (report.failed_count()) }
                        span.label { (t!("html_report.summary_failed", locale = locale)) }
                    }
                }
                table {
                    thead {
                        tr {
                            th { (t!("html_report.header_name", locale = locale)) }
                            th { (t!("html_report.header_status", locale = locale)) }
                            th { (t!("html_report.header_exit_code", locale = locale)) }
                            th { (t!("html_report.header_duration", locale = locale)) }
                        }
                    }
                    tbody {
                        @for result in &report.results {
                            (result_row(result, locale))
                        }
                    }
                }
            }
        }
    };
    markup.into_string()
}

fn result_row(result: &EvaluationResult, locale: &str) -> Markup {
    let notes = result_notes(result, locale);
    html! {
        tr {
            td {
                (result.name)
                @for failure in &result.failed_checks {
                    div {
                        strong { (failure.check.label(locale)) }
                        pre {
                            span.expected {
                                "- " (t!("report.expected", locale = locale)) ": "
                                (failure.expected.clone().unwrap_or_else(|| t!("report.unspecified", locale = locale).to_string()))
                            }
                            "\n"
                            span.actual { "+ " (t!("report.actual", locale = locale)) ": " (failure.actual) }
                        }
                    }
                }
                @if !notes.is_empty() {
                    ul {
                        @for note in &notes {
                            li { (note) }
                        }
                    }
                }
                details {
                    summary { (t!("html_report.captured_output", locale = locale)) }
                    h4 { (t!("html_report.captured_stdout", locale = locale)) }
                    pre { (String::from_utf8_lossy(&result.stdout)) }
                    h4 { (t!("html_report.captured_stderr", locale = locale)) }
                    pre { (String::from_utf8_lossy(&result.stderr)) }
                }
            }
            td { div class={ "status-cell " (result.status_class()) } { (result.status_str(locale)) } }
            td { (result.exit_code) }
            td { (format!("{:.2?}", result.duration)) }
        }
    }
}

fn result_notes(result: &EvaluationResult, locale: &str) -> Vec<String> {
    let mut notes = Vec::new();
    match &result.outcome {
        Outcome::LaunchFailed { error } => {
            notes.push(t!("report.launch_error", locale = locale, error = error).to_string());
        }
        Outcome::TimedOut { after } => {
            let secs = format!("{:.2}", after.as_secs_f64());
            notes.push(t!("report.timed_out_after", locale = locale, secs = secs).to_string());
        }
        _ => {}
    }
    if let Some(signal) = result.signal {
        notes.push(t!("report.signal", locale = locale, signal = signal).to_string());
    }
    for (label, dropped) in [
        (t!("report.stdout", locale = locale), result.stdout_dropped),
        (t!("report.stderr", locale = locale), result.stderr_dropped),
    ] {
        if dropped > 0 {
            notes.push(
                t!(
                    "report.truncated",
                    locale = locale,
                    stream = label,
                    dropped = dropped
                )
                .to_string(),
            );
        }
    }
    notes
}

/// Renders the report and writes it to `output_path`.
///
/// # Errors / 错误
/// Returns an error if the file cannot be written.
/// 无法写入文件时返回错误。
pub fn generate_html_report(report: &SuiteReport, output_path: &Path, locale: &str) -> Result<()> {
    fs::write_report(output_path, &render_html_report(report, locale))
}
