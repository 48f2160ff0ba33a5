//! # Suite Configuration Module / 套件配置模块
//!
//! The TOML representation of a test suite and its conversion into
//! [`TestCase`] descriptors.
//!
//! 测试套件的 TOML 表示形式，以及将其转换为 [`TestCase`] 描述符的逻辑。

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::core::buffer::DEFAULT_BUFFER_CAPACITY;
use crate::core::case::{ExitCodeValidator, OutputValidator, TestCase};
use crate::infra::{fs as infra_fs, t};

/// Expectation for a captured stream. A bare string is an exact match.
/// 对捕获流的期望。裸字符串表示精确匹配。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StreamExpectation {
    Literal(String),
    Rule(StreamRule),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamRule {
    Exact(String),
    Contains(String),
    Regex(String),
}

impl StreamExpectation {
    pub fn to_validator(&self) -> Result<OutputValidator> {
        match self {
            StreamExpectation::Literal(text) | StreamExpectation::Rule(StreamRule::Exact(text)) => {
                Ok(OutputValidator::exact(text.as_bytes()))
            }
            StreamExpectation::Rule(StreamRule::Contains(needle)) => {
                Ok(OutputValidator::contains(needle.as_bytes()))
            }
            StreamExpectation::Rule(StreamRule::Regex(pattern)) => {
                OutputValidator::matches(pattern)
            }
        }
    }
}

/// Expectation for the exit code. A bare integer is an exact match.
/// 对退出码的期望。裸整数表示精确匹配。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ExitExpectation {
    Code(i32),
    Rule(ExitRule),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitRule {
    AnyOf(Vec<i32>),
    Not(i32),
}

impl ExitExpectation {
    pub fn to_validator(&self) -> ExitCodeValidator {
        match self {
            ExitExpectation::Code(code) => ExitCodeValidator::equals(*code),
            ExitExpectation::Rule(ExitRule::AnyOf(codes)) => {
                ExitCodeValidator::one_of(codes.iter().copied())
            }
            ExitExpectation::Rule(ExitRule::Not(code)) => ExitCodeValidator::not(*code),
        }
    }
}

/// Values applied to every case that leaves the corresponding field unset.
/// 应用于所有未设置对应字段的用例的默认值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CaseDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<StreamExpectation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<StreamExpectation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<ExitExpectation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// One `[[cases]]` entry. Unset expectations accept anything.
/// 一个 `[[cases]]` 条目。未设置的期望接受任何值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CaseConfig {
    pub name: String,
    /// Literal stdin payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
    /// File whose bytes are sent as stdin, relative to the suite file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Arguments as one shell-style string, e.g. `-n 'two words'`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<StreamExpectation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<StreamExpectation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<ExitExpectation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// A whole suite file (`FuncTests.toml`).
/// 完整的套件文件（`FuncTests.toml`）。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TestSuite {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default = "default_language")]
    pub language: String,

    /// Program under test. `~` and `$VARS` are expanded; a relative path
    /// containing `/` is resolved against the suite file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,

    /// Deadline for cases without their own `timeout_secs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    #[serde(default)]
    pub defaults: CaseDefaults,

    #[serde(default)]
    pub cases: Vec<CaseConfig>,
}

pub fn default_language() -> String {
    "en".to_string()
}

pub fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

impl Default for TestSuite {
    fn default() -> Self {
        Self {
            language: default_language(),
            binary: None,
            timeout_secs: None,
            buffer_capacity: default_buffer_capacity(),
            defaults: CaseDefaults::default(),
            cases: Vec::new(),
        }
    }
}

impl TestSuite {
    /// Parses a suite from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| t!("config_parse_failed").to_string())
    }

    /// Default deadline for every case, from the suite-level `timeout_secs`.
    pub fn default_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Builds one [`TestCase`] per `[[cases]]` entry, applying `[defaults]`.
    /// Relative `stdin_file` paths are resolved against `base_dir`.
    ///
    /// 为每个 `[[cases]]` 条目构建一个 [`TestCase`]，并应用 `[defaults]`。
    pub fn to_test_cases(&self, base_dir: &Path) -> Result<Vec<TestCase>> {
        self.cases
            .iter()
            .map(|case| {
                self.build_case(case, base_dir)
                    .with_context(|| format!("Invalid test case '{}'", case.name))
            })
            .collect()
    }

    fn build_case(&self, case: &CaseConfig, base_dir: &Path) -> Result<TestCase> {
        let defaults = &self.defaults;
        let mut builder = TestCase::builder(&case.name);

        builder = match (&case.stdin, &case.stdin_file) {
            (Some(_), Some(_)) => bail!("`stdin` and `stdin_file` cannot both be set."),
            (Some(text), None) => builder.stdin(text.as_bytes()),
            (None, Some(file)) => builder.stdin(infra_fs::read_stdin_file(&base_dir.join(file))?),
            (None, None) => builder,
        };

        builder = match (&case.args, &case.command_line) {
            (Some(_), Some(_)) => bail!("`args` and `command_line` cannot both be set."),
            (Some(args), None) => builder.args(args),
            (None, Some(line)) => match shlex::split(line) {
                Some(args) => builder.args(args),
                None => bail!("Cannot split command line: {line}"),
            },
            (None, None) => builder.args(defaults.args.iter().flatten()),
        };

        if let Some(expectation) = case.stdout.as_ref().or(defaults.stdout.as_ref()) {
            let validator = expectation
                .to_validator()
                .context("Invalid stdout expectation")?;
            builder = builder.expect_stdout(validator);
        }
        if let Some(expectation) = case.stderr.as_ref().or(defaults.stderr.as_ref()) {
            let validator = expectation
                .to_validator()
                .context("Invalid stderr expectation")?;
            builder = builder.expect_stderr(validator);
        }
        if let Some(expectation) = case.exit_code.as_ref().or(defaults.exit_code.as_ref()) {
            builder = builder.expect_exit_code(expectation.to_validator());
        }
        if let Some(secs) = case.timeout_secs.or(defaults.timeout_secs) {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }
}

/// Reads and parses a suite file.
///
/// 读取并解析套件文件。
pub fn load_test_suite(path: &Path) -> Result<TestSuite> {
    let content = fs::read_to_string(path)
        .with_context(|| t!("config_read_failed_path", path = path.display()).to_string())?;
    TestSuite::from_toml(&content)
}
