//! # Func Runner Library / Func Runner 库
//!
//! This library provides the core functionality for the Func Runner tool,
//! a parallel functional test harness for command-line programs. Every test
//! feeds bytes to a program's stdin, captures its stdout and stderr, and checks
//! both streams and the exit code. All tests of a suite run concurrently,
//! multiplexed by a single readiness loop.
//!
//! 此库为 Func Runner 工具提供核心功能，
//! 这是一个面向命令行程序的并行功能测试框架。每个测试向程序的 stdin 写入字节，
//! 捕获其 stdout 与 stderr，并检查两个输出流和退出码。
//! 套件中的所有测试并发运行，由单个就绪事件循环多路复用。
//!
//! ## Modules / 模块
//!
//! - `core` - Test case descriptors, suite configuration and the execution engine
//! - `infra` - Infrastructure services like process control, file system operations and logging
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` / `commands` - Command-line interface and commands
//!
//! - `core` - 测试用例描述符、套件配置和执行引擎
//! - `infra` - 基础设施服务，如进程控制、文件系统操作和日志
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` / `commands` - 命令行接口和命令
//!
//! ## Example / 示例
//!
//! ```no_run
//! use func_runner::{OutputValidator, TestCase, run};
//!
//! # fn main() -> anyhow::Result<()> {
//! let case = TestCase::builder("echo")
//!     .stdin("42")
//!     .expect_stdout(OutputValidator::exact("42"))
//!     .build()?;
//! let report = run("/bin/cat", &[case])?;
//! assert!(report.all_passed());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::{
    EvaluationResult, ExitCodeValidator, Outcome, OutputValidator, RunOptions, Runner,
    SuiteReport, TestCase, TestCaseBuilder, Validator, config, models, run,
};

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// POSIX-style names such as `zh_CN.UTF-8` are normalized to `zh-CN` first.
/// The full locale is tried, then the language code alone, then `en`.
///
/// 根据系统区域设置初始化国际化。`zh_CN.UTF-8` 这类 POSIX 名称会先规范化为 `zh-CN`，
/// 依次尝试完整区域、仅语言代码，最后回退到 `en`。
pub fn init() {
    let detected = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    rust_i18n::set_locale(&match_locale(&detected));
}

/// Maps a detected locale name onto one of the bundled translations.
pub fn match_locale(detected: &str) -> String {
    let available_locales = rust_i18n::available_locales!();
    let normalized = detected
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .replace('_', "-");

    if available_locales.contains(&normalized.as_str()) {
        return normalized;
    }
    normalized
        .split('-')
        .next()
        .filter(|lang_code| available_locales.contains(lang_code))
        .unwrap_or("en")
        .to_string()
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");