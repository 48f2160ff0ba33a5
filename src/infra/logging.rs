//! # Logging Module / 日志模块
//!
//! Diagnostic logging for the engine. Events go to stderr so they never mix
//! with the report printed on stdout.
//!
//! 引擎的诊断日志。事件输出到 stderr，不会与打印到 stdout 的报告混在一起。

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `func_runner=debug`.
pub const LOG_ENV: &str = "FUNC_RUNNER_LOG";

/// Installs the global subscriber. `verbose` raises the default level to `debug`;
/// an explicit `FUNC_RUNNER_LOG` always wins. Calling it twice is harmless.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "func_runner=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
