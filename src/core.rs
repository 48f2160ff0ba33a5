//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Func Runner: test case
//! descriptors, suite configuration, and the concurrent execution engine
//! (launcher, collector, evaluator, runner).
//!
//! 此模块包含 Func Runner 的核心功能：测试用例描述符、套件配置，
//! 以及并发执行引擎（启动器、收集器、评估器、运行器）。

pub mod buffer;
pub mod case;
pub mod collector;
pub mod config;
pub mod evaluator;
pub mod launcher;
pub mod models;
pub mod runner;
pub mod session;

// Re-exports
pub use buffer::{DEFAULT_BUFFER_CAPACITY, OutputBuffer};
pub use case::{ExitCodeValidator, OutputValidator, TestCase, TestCaseBuilder, Validator};
pub use config::TestSuite;
pub use models::{
    Check, EXEC_FAILURE_EXIT_CODE, EvaluationResult, FailedCheck, Outcome, SIGNAL_EXIT_CODE,
    SuiteReport,
};
pub use runner::{RunOptions, Runner, run};
