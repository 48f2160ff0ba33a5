//! # Test Case Module / 测试用例模块
//!
//! Defines the immutable [`TestCase`] descriptor, the builder used to assemble it,
//! and the single [`Validator`] predicate type used for stdout, stderr and exit codes.
//!
//! 定义不可变的 [`TestCase`] 描述符、用于组装它的构建器，
//! 以及用于 stdout、stderr 和退出码的统一 [`Validator`] 谓词类型。

use anyhow::{Context, Result, bail};
use regex::bytes::Regex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::models::display_bytes;

/// A predicate deciding whether a captured value meets expectations.
///
/// Literal comparisons and arbitrary closures share this one type: an exact match
/// is just a predicate closing over the expected value. The optional `expectation`
/// is a human-readable rendering of what was expected, shown in failure reports.
///
/// 判断捕获值是否符合预期的谓词。
/// 字面量比较与任意闭包共享同一类型：精确匹配只是一个捕获了期望值的谓词。
pub struct Validator<T: ?Sized> {
    check: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    expectation: Option<String>,
}

/// Validator applied to a captured stdout or stderr byte stream.
pub type OutputValidator = Validator<[u8]>;
/// Validator applied to the exit code (`-1` when killed by a signal).
pub type ExitCodeValidator = Validator<i32>;

impl<T: ?Sized> Validator<T> {
    /// Accepts every value. This is the default for unspecified expectations.
    pub fn accept_all() -> Self {
        Self {
            check: Arc::new(|_: &T| true),
            expectation: None,
        }
    }

    /// Wraps an arbitrary predicate. `expectation` describes it in reports.
    pub fn from_fn<F>(expectation: impl Into<String>, check: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
            expectation: Some(expectation.into()),
        }
    }

    pub fn check(&self, value: &T) -> bool {
        (self.check)(value)
    }

    pub fn expectation(&self) -> Option<&str> {
        self.expectation.as_deref()
    }
}

impl Validator<[u8]> {
    /// Byte-for-byte equality with `expected`.
    pub fn exact(expected: impl Into<Vec<u8>>) -> Self {
        let expected = expected.into();
        Self {
            expectation: Some(display_bytes(&expected)),
            check: Arc::new(move |actual: &[u8]| actual == expected.as_slice()),
        }
    }

    /// Accepts output containing `needle` anywhere.
    pub fn contains(needle: impl Into<Vec<u8>>) -> Self {
        let needle = needle.into();
        Self {
            expectation: Some(format!("contains {}", display_bytes(&needle))),
            check: Arc::new(move |actual: &[u8]| {
                needle.is_empty() || actual.windows(needle.len()).any(|w| w == needle.as_slice())
            }),
        }
    }

    /// Accepts output matched by `pattern` (unanchored, like `Regex::is_match`).
    pub fn matches(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid output pattern: {pattern}"))?;
        Ok(Self {
            expectation: Some(format!("matches /{pattern}/")),
            check: Arc::new(move |actual: &[u8]| regex.is_match(actual)),
        })
    }
}

impl Validator<i32> {
    pub fn equals(expected: i32) -> Self {
        Self {
            expectation: Some(expected.to_string()),
            check: Arc::new(move |actual: &i32| *actual == expected),
        }
    }

    pub fn one_of(codes: impl IntoIterator<Item = i32>) -> Self {
        let codes: Vec<i32> = codes.into_iter().collect();
        let listed = codes
            .iter()
            .map(i32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            expectation: Some(format!("one of [{listed}]")),
            check: Arc::new(move |actual: &i32| codes.contains(actual)),
        }
    }

    /// Accepts any exit code except `rejected`; `not(0)` means "must fail".
    pub fn not(rejected: i32) -> Self {
        Self {
            expectation: Some(format!("anything but {rejected}")),
            check: Arc::new(move |actual: &i32| *actual != rejected),
        }
    }
}

impl<T: ?Sized> Clone for Validator<T> {
    fn clone(&self) -> Self {
        Self {
            check: Arc::clone(&self.check),
            expectation: self.expectation.clone(),
        }
    }
}

impl<T: ?Sized> Default for Validator<T> {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl<T: ?Sized> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expectation {
            Some(expectation) => write!(f, "Validator({expectation})"),
            None => f.write_str("Validator(<any>)"),
        }
    }
}

/// Immutable description of one functional test.
/// 单个功能测试的不可变描述。
#[derive(Debug, Clone)]
pub struct TestCase {
    name: String,
    stdin: Vec<u8>,
    args: Vec<String>,
    stdout: OutputValidator,
    stderr: OutputValidator,
    exit_code: ExitCodeValidator,
    timeout: Option<Duration>,
}

impl TestCase {
    pub fn builder(name: impl Into<String>) -> TestCaseBuilder {
        TestCaseBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stdin(&self) -> &[u8] {
        &self.stdin
    }

    /// Arguments appended after the program path.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn stdout_validator(&self) -> &OutputValidator {
        &self.stdout
    }

    pub fn stderr_validator(&self) -> &OutputValidator {
        &self.stderr
    }

    pub fn exit_code_validator(&self) -> &ExitCodeValidator {
        &self.exit_code
    }

    /// Per-test deadline; `None` falls back to the run's default timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Builder for [`TestCase`]. Every field has a default, so only the overrides
/// a test cares about need to be set. Builders are `Clone`, which lets one
/// partially configured builder seed several cases.
///
/// [`TestCase`] 的构建器。每个字段都有默认值，只需设置测试关心的覆盖项。
/// 构建器实现了 `Clone`，一个部分配置好的构建器可以作为多个用例的起点。
#[derive(Debug, Clone, Default)]
pub struct TestCaseBuilder {
    name: String,
    stdin: Vec<u8>,
    args: Vec<String>,
    stdout: OutputValidator,
    stderr: OutputValidator,
    exit_code: ExitCodeValidator,
    timeout: Option<Duration>,
}

impl TestCaseBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = input.into();
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Replaces the argument list.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn expect_stdout(mut self, validator: OutputValidator) -> Self {
        self.stdout = validator;
        self
    }

    pub fn expect_stderr(mut self, validator: OutputValidator) -> Self {
        self.stderr = validator;
        self
    }

    pub fn expect_exit_code(mut self, validator: ExitCodeValidator) -> Self {
        self.exit_code = validator;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<TestCase> {
        if self.name.trim().is_empty() {
            bail!("A test case needs a non-empty name.");
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            bail!("Test case '{}' has a zero timeout.", self.name);
        }
        Ok(TestCase {
            name: self.name,
            stdin: self.stdin,
            args: self.args,
            stdout: self.stdout,
            stderr: self.stderr,
            exit_code: self.exit_code,
            timeout: self.timeout,
        })
    }
}
