//! # Suite Initialization Module / 套件初始化模块
//!
//! This module creates a starter `FuncTests.toml` through an interactive
//! command-line wizard, or with defaults when `--non-interactive` is given.
//!
//! 此模块通过交互式命令行向导创建初始的 `FuncTests.toml`，
//! 或在指定 `--non-interactive` 时使用默认值创建。
//!
//! ## Features / 功能特性
//!
//! - **Interactive Wizard**: Prompts for the program under test and the default timeout
//! - **Starter Cases**: A passing stdin/stdout case and a rejected-flag case to edit
//! - **Overwrite Protection**: Confirmation prompt before overwriting an existing suite
//!
//! - **交互式向导**: 提示输入被测程序和默认超时时间
//! - **初始用例**: 一个 stdin/stdout 用例和一个非法参数用例，供用户修改
//! - **覆盖保护**: 覆盖现有套件文件前的确认提示

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::fs;
use std::path::Path;

use crate::cli::DEFAULT_CONFIG;
use crate::core::config::{
    CaseConfig, CaseDefaults, ExitExpectation, ExitRule, StreamExpectation, TestSuite,
    default_buffer_capacity,
};
use crate::infra::t;

const DEFAULT_BINARY: &str = "./my-program";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Runs the wizard and writes `FuncTests.toml` in the current directory.
///
/// 运行向导并在当前目录写入 `FuncTests.toml`。
pub fn run_init_wizard(language: &str, non_interactive: bool) -> Result<()> {
    let config_path = Path::new(DEFAULT_CONFIG);

    if non_interactive {
        let suite = default_suite(language, DEFAULT_BINARY, DEFAULT_TIMEOUT_SECS);
        return write_config(config_path, &suite, language);
    }

    let theme = ColorfulTheme::default();
    println!("\n{}", t!("init.welcome", locale = language).cyan().bold());
    println!("{}", t!("init.description", locale = language));

    if config_path.exists() {
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!(
                "init.overwrite_prompt",
                locale = language,
                path = config_path.display()
            ))
            .default(false)
            .interact()
            .context(t!("init.confirmation_failed", locale = language).to_string())?;
        if !confirmation {
            println!("{}", t!("init.aborted", locale = language));
            return Ok(());
        }
    }

    let binary: String = Input::with_theme(&theme)
        .with_prompt(t!("init.binary_prompt", locale = language))
        .default(DEFAULT_BINARY.to_string())
        .interact_text()
        .context(t!("init.confirmation_failed", locale = language).to_string())?;
    let timeout_secs: u64 = Input::with_theme(&theme)
        .with_prompt(t!("init.timeout_prompt", locale = language))
        .default(DEFAULT_TIMEOUT_SECS)
        .interact_text()
        .context(t!("init.confirmation_failed", locale = language).to_string())?;

    let suite = default_suite(language, &binary, timeout_secs);
    write_config(config_path, &suite, language)
}

/// The starter suite: every case must exit 0 unless it says otherwise.
pub fn default_suite(language: &str, binary: &str, timeout_secs: u64) -> TestSuite {
    TestSuite {
        language: language.to_string(),
        binary: Some(binary.to_string()),
        timeout_secs: Some(timeout_secs),
        buffer_capacity: default_buffer_capacity(),
        defaults: CaseDefaults {
            exit_code: Some(ExitExpectation::Code(0)),
            ..CaseDefaults::default()
        },
        cases: vec![
            CaseConfig {
                name: "echoes-input".to_string(),
                stdin: Some("hello\n".to_string()),
                stdout: Some(StreamExpectation::Literal("hello\n".to_string())),
                stderr: Some(StreamExpectation::Literal(String::new())),
                ..CaseConfig::default()
            },
            CaseConfig {
                name: "rejects-unknown-flag".to_string(),
                args: Some(vec!["--no-such-flag".to_string()]),
                exit_code: Some(ExitExpectation::Rule(ExitRule::Not(0))),
                ..CaseConfig::default()
            },
        ],
    }
}

fn write_config(path: &Path, suite: &TestSuite, language: &str) -> Result<()> {
    let toml_string = toml::to_string_pretty(suite)
        .context(t!("init.serialize_failed", locale = language).to_string())?;

    fs::write(path, toml_string)
        .with_context(|| {
            t!("init.write_failed", locale = language, path = path.display()).to_string()
        })?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success_created", locale = language, path = path.display()).bold()
    );
    println!("{}", t!("init.usage_hint", locale = language));

    Ok(())
}
