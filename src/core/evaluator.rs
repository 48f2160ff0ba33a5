//! # Result Evaluator Module / 结果评估模块
//!
//! Reaps every process of a session in descriptor order and judges it against
//! its validators.
//!
//! 按描述符顺序回收会话中的每个进程，并根据其验证器进行评判。

use anyhow::{Context, Result};
use std::process::ExitStatus;
use std::thread;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::launcher::{ProcessHandle, Termination};
use crate::core::models::{
    Check, EXEC_FAILURE_EXIT_CODE, EvaluationResult, FailedCheck, Outcome, SIGNAL_EXIT_CODE,
    display_bytes,
};
use crate::core::session::RunSession;
use crate::infra::process;

/// How often a bounded reap polls the child for an exit status.
const REAP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Produces one result per process, in the order the test cases were given.
pub fn evaluate(session: &mut RunSession<'_>) -> Result<Vec<EvaluationResult>> {
    let kill_grace = session.kill_grace;
    let cancel = session.cancel.clone();

    let mut results = Vec::with_capacity(session.handles.len());
    for handle in session.handles.iter_mut() {
        reap(handle, kill_grace, cancel.as_ref())?;
        results.push(judge(handle));
    }
    Ok(results)
}

/// Waits for the exit status. With a deadline or a cancellation token the wait
/// is bounded: a child that outlives it is killed first.
fn reap(
    handle: &mut ProcessHandle<'_>,
    kill_grace: Duration,
    cancel: Option<&CancellationToken>,
) -> Result<()> {
    if handle.status.is_some() || handle.child.is_none() {
        return Ok(());
    }

    let bounded = handle.termination.is_none() && (handle.deadline.is_some() || cancel.is_some());
    if bounded {
        loop {
            if let Some(status) = try_wait(handle)? {
                record_exit(handle, status);
                return Ok(());
            }
            let now = Instant::now();
            let reason = if cancel.is_some_and(CancellationToken::is_cancelled) {
                Some(Termination::Cancelled)
            } else if handle.deadline.is_some_and(|d| d <= now) {
                Some(Termination::TimedOut)
            } else {
                None
            };
            if let Some(reason) = reason {
                handle.terminate(reason, now + kill_grace);
                break;
            }
            let nap = handle.deadline.map_or(REAP_POLL_INTERVAL, |d| {
                d.saturating_duration_since(now).min(REAP_POLL_INTERVAL)
            });
            thread::sleep(nap);
        }
    }

    let case = handle.case;
    let Some(child) = handle.child.as_mut() else {
        return Ok(());
    };
    let status = child
        .wait()
        .with_context(|| format!("Failed to reap the process of test '{}'", case.name()))?;
    record_exit(handle, status);
    Ok(())
}

fn try_wait(handle: &mut ProcessHandle<'_>) -> Result<Option<ExitStatus>> {
    let case = handle.case;
    match handle.child.as_mut() {
        Some(child) => child
            .try_wait()
            .with_context(|| format!("Failed to poll the process of test '{}'", case.name())),
        None => Ok(None),
    }
}

fn record_exit(handle: &mut ProcessHandle<'_>, status: ExitStatus) {
    debug!(test = %handle.case.name(), %status, "reaped");
    handle.status = Some(status);
    handle.finished = Some(Instant::now());
}

/// Applies the three validators. They are uniform predicates: a literal
/// expectation and a custom closure go through the same call.
fn judge(handle: &ProcessHandle<'_>) -> EvaluationResult {
    let case = handle.case;
    let (exit_code, signal) = match (handle.status, &handle.launch_error) {
        (Some(status), _) => process::exit_code_of(status),
        (None, Some(_)) => (EXEC_FAILURE_EXIT_CODE, None),
        (None, None) => (SIGNAL_EXIT_CODE, None),
    };
    let stdout = handle.stdout_buf.as_bytes();
    let stderr = handle.stderr_buf.as_bytes();

    let mut failed_checks = Vec::new();
    if !case.stdout_validator().check(stdout) {
        failed_checks.push(FailedCheck {
            check: Check::Stdout,
            expected: case.stdout_validator().expectation().map(str::to_owned),
            actual: display_bytes(stdout),
        });
    }
    if !case.stderr_validator().check(stderr) {
        failed_checks.push(FailedCheck {
            check: Check::Stderr,
            expected: case.stderr_validator().expectation().map(str::to_owned),
            actual: display_bytes(stderr),
        });
    }
    if !case.exit_code_validator().check(&exit_code) {
        failed_checks.push(FailedCheck {
            check: Check::ExitCode,
            expected: case.exit_code_validator().expectation().map(str::to_owned),
            actual: exit_code.to_string(),
        });
    }

    let outcome = match (&handle.launch_error, handle.termination) {
        (Some(error), _) => Outcome::LaunchFailed {
            error: error.clone(),
        },
        (None, Some(Termination::TimedOut)) => Outcome::TimedOut {
            after: handle.timeout.unwrap_or_default(),
        },
        (None, Some(Termination::Cancelled)) => Outcome::Cancelled,
        (None, None) if failed_checks.is_empty() => Outcome::Passed,
        (None, None) => Outcome::Failed,
    };

    let finished = handle.finished.unwrap_or_else(Instant::now);
    EvaluationResult {
        name: case.name().to_string(),
        outcome,
        stdout: stdout.to_vec(),
        stderr: stderr.to_vec(),
        stdout_dropped: handle.stdout_buf.dropped_bytes(),
        stderr_dropped: handle.stderr_buf.dropped_bytes(),
        exit_code,
        signal,
        failed_checks,
        duration: finished.saturating_duration_since(handle.started),
    }
}
