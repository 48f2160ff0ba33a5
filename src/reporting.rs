//! # Reporting Module / 报告模块
//!
//! This module turns a [`SuiteReport`](crate::core::models::SuiteReport) into
//! human- and machine-readable output: a colored console summary, a
//! self-contained HTML page and a JSON document.
//!
//! 此模块将 [`SuiteReport`](crate::core::models::SuiteReport) 转换为
//! 人类和机器可读的输出：彩色控制台摘要、独立的 HTML 页面以及 JSON 文档。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_report, render_report};
pub use html::{generate_html_report, render_html_report};
pub use json::{render_json_report, write_json_report};
