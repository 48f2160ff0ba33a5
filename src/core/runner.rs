//! # Test Runner Module / 测试运行器模块
//!
//! Orchestrates one suite invocation: launch every test, collect all output,
//! evaluate, and hand back a [`SuiteReport`]. Nothing survives between runs.
//!
//! 编排一次套件调用：启动所有测试、收集全部输出、评估，
//! 并返回 [`SuiteReport`]。两次运行之间不保留任何状态。

use anyhow::{Result, bail};
use chrono::Local;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::buffer::DEFAULT_BUFFER_CAPACITY;
use crate::core::case::TestCase;
use crate::core::collector::collect;
use crate::core::evaluator::evaluate;
use crate::core::launcher::launch;
use crate::core::models::SuiteReport;
use crate::core::session::RunSession;

/// How long a killed process group gets to let its pipes reach EOF.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(500);

/// Knobs for a run. The defaults capture 4096 bytes per stream and never time out.
/// 运行参数。默认每个流捕获 4096 字节且永不超时。
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Bytes captured per stream before truncation.
    pub buffer_capacity: usize,
    /// Deadline for tests that do not set their own.
    pub default_timeout: Option<Duration>,
    /// Time allowed for output to drain after a process group is killed.
    pub kill_grace: Duration,
    /// When cancelled, every running test is killed and reported as cancelled.
    pub cancel: Option<CancellationToken>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            default_timeout: None,
            kill_grace: DEFAULT_KILL_GRACE,
            cancel: None,
        }
    }
}

/// Runs test cases against one program.
#[derive(Debug, Clone)]
pub struct Runner {
    binary: PathBuf,
    options: RunOptions,
}

impl Runner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Launches every case in parallel and returns one result per case, in order.
    ///
    /// Fails only on harness errors (invalid case set, pipe or process creation
    /// failure, multiplexer failure). Failing tests are reported, not returned as errors.
    ///
    /// 并行启动所有用例，按顺序为每个用例返回一个结果。
    /// 仅在框架错误时失败；测试失败会被报告而不是作为错误返回。
    pub fn run(&self, cases: &[TestCase]) -> Result<SuiteReport> {
        check_names(cases)?;
        if self.options.buffer_capacity == 0 {
            bail!("The output buffer capacity must be at least one byte.");
        }

        let started_at = Local::now();
        let start = Instant::now();
        info!(binary = %self.binary.display(), tests = cases.len(), "starting run");

        let mut session = RunSession::new(cases.len(), &self.options)?;
        for (index, case) in cases.iter().enumerate() {
            let handle = launch(index, case, &self.binary, self.options.buffer_capacity)?;
            session.register(handle)?;
        }
        debug!(streams = session.remaining(), "all tests launched");

        collect(&mut session)?;
        let results = evaluate(&mut session)?;
        drop(session);

        debug_assert_eq!(results.len(), cases.len());
        let duration = start.elapsed();
        info!(?duration, "run finished");

        Ok(SuiteReport {
            binary: self.binary.clone(),
            started_at,
            duration,
            results,
        })
    }
}

/// Runs `cases` against `binary` with default options.
pub fn run(binary: impl AsRef<Path>, cases: &[TestCase]) -> Result<SuiteReport> {
    Runner::new(binary.as_ref()).run(cases)
}

fn check_names(cases: &[TestCase]) -> Result<()> {
    let mut seen = HashSet::with_capacity(cases.len());
    for case in cases {
        if case.name().trim().is_empty() {
            bail!("Every test case needs a non-empty name.");
        }
        if !seen.insert(case.name()) {
            bail!("Duplicate test case name: '{}'", case.name());
        }
    }
    Ok(())
}
