//! # Run Session Module / 运行会话模块
//!
//! Live state of one suite invocation: the launched processes, the readiness
//! multiplexer they are registered with, and the count of output streams that
//! have not reached EOF yet.
//!
//! 一次套件调用的实时状态：已启动的进程、它们注册的就绪多路复用器，
//! 以及尚未到达 EOF 的输出流计数。

use anyhow::{Context, Result};
use mio::{Interest, Poll, Registry, Token};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::launcher::{ProcessHandle, StreamKind, Termination};
use crate::core::runner::RunOptions;
use crate::infra::process;

/// Upper bound on how long the loop sleeps when a cancellation token is attached.
const CANCEL_CHECK_INTERVAL: Duration = Duration::from_millis(100);

pub(crate) fn token_for(index: usize, kind: StreamKind) -> Token {
    let slot = match kind {
        StreamKind::Stdin => 0,
        StreamKind::Stdout => 1,
        StreamKind::Stderr => 2,
    };
    Token(index * 3 + slot)
}

pub(crate) fn decode_token(token: Token) -> (usize, StreamKind) {
    let kind = match token.0 % 3 {
        0 => StreamKind::Stdin,
        1 => StreamKind::Stdout,
        _ => StreamKind::Stderr,
    };
    (token.0 / 3, kind)
}

pub struct RunSession<'a> {
    pub(crate) poll: Poll,
    pub(crate) handles: Vec<ProcessHandle<'a>>,
    pub(crate) remaining: usize,
    pub(crate) default_timeout: Option<Duration>,
    pub(crate) kill_grace: Duration,
    pub(crate) cancel: Option<CancellationToken>,
}

impl<'a> RunSession<'a> {
    /// Creates an empty session expecting `test_count` processes, i.e.
    /// `2 * test_count` output streams.
    pub fn new(test_count: usize, options: &RunOptions) -> Result<Self> {
        let poll = Poll::new().context("Failed to create the I/O multiplexer")?;
        Ok(Self {
            poll,
            handles: Vec::with_capacity(test_count),
            remaining: 2 * test_count,
            default_timeout: options.default_timeout,
            kill_grace: options.kill_grace,
            cancel: options.cancel.clone(),
        })
    }

    /// Takes ownership of a launched process and registers its pipes.
    /// Streams that never opened count as already at EOF.
    pub fn register(&mut self, handle: ProcessHandle<'a>) -> Result<()> {
        debug_assert_eq!(handle.index, self.handles.len());
        self.handles.push(handle);

        let RunSession {
            poll,
            handles,
            remaining,
            default_timeout,
            ..
        } = self;
        let registry = poll.registry();
        let Some(handle) = handles.last_mut() else {
            return Ok(());
        };
        let index = handle.index;

        if handle.child.is_some() {
            handle.timeout = handle.case.timeout().or(*default_timeout);
            handle.deadline = handle.timeout.map(|t| handle.started + t);
        }

        for kind in [StreamKind::Stdout, StreamKind::Stderr] {
            match handle.receiver_mut(kind) {
                Some(pipe) => registry
                    .register(pipe, token_for(index, kind), Interest::READABLE)
                    .with_context(|| format!("Failed to watch {kind:?} of test {index}"))?,
                None => *remaining -= 1,
            }
        }
        if let Some(feed) = handle.stdin.as_mut() {
            registry
                .register(
                    &mut feed.pipe,
                    token_for(index, StreamKind::Stdin),
                    Interest::WRITABLE,
                )
                .with_context(|| format!("Failed to watch stdin of test {index}"))?;
        }
        Ok(())
    }

    /// Output streams still waiting for EOF.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// `true` while any output stream is open or any stdin payload is undelivered.
    pub fn has_pending_io(&self) -> bool {
        self.remaining > 0 || self.handles.iter().any(|h| h.stdin.is_some())
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// How long the multiplexer may block: until the nearest live deadline,
    /// capped so a cancellation request is noticed promptly.
    pub(crate) fn next_timeout(&self, now: Instant) -> Option<Duration> {
        let nearest = self
            .handles
            .iter()
            .filter(|h| h.is_active())
            .filter_map(|h| h.deadline)
            .min()
            .map(|deadline| deadline.saturating_duration_since(now));

        match (nearest, self.cancel.is_some()) {
            (Some(wait), true) => Some(wait.min(CANCEL_CHECK_INTERVAL)),
            (None, true) => Some(CANCEL_CHECK_INTERVAL),
            (wait, false) => wait,
        }
    }

    /// Kills processes whose deadline expired or that were cancelled. A process
    /// whose pipes stay open past the kill grace period (a descendant left the
    /// process group) has them closed forcibly, stdin included.
    pub(crate) fn enforce_deadlines(&mut self, now: Instant) {
        let cancelled = self.is_cancelled();
        let grace_deadline = now + self.kill_grace;
        let RunSession {
            poll,
            handles,
            remaining,
            ..
        } = self;
        let registry = poll.registry();

        for handle in handles.iter_mut().filter(|h| h.is_active()) {
            if cancelled && handle.termination.is_none() {
                handle.terminate(Termination::Cancelled, grace_deadline);
                continue;
            }
            let Some(deadline) = handle.deadline else {
                continue;
            };
            if deadline > now {
                continue;
            }
            if handle.termination.is_none() {
                handle.terminate(Termination::TimedOut, grace_deadline);
            } else {
                warn!(
                    test = %handle.case.name(),
                    "pipes still open after the process group was killed; abandoning them"
                );
                close_output(registry, handle, StreamKind::Stdout, remaining);
                close_output(registry, handle, StreamKind::Stderr, remaining);
                close_stdin(registry, handle);
                handle.deadline = None;
            }
        }
    }

}

/// Deregisters and closes one output pipe, freezes its buffer and counts the EOF.
/// Closing an already closed stream is a no-op, so each stream is counted once.
pub(crate) fn close_output(
    registry: &Registry,
    handle: &mut ProcessHandle<'_>,
    kind: StreamKind,
    remaining: &mut usize,
) {
    let pipe = match kind {
        StreamKind::Stdout => handle.stdout.take(),
        StreamKind::Stderr => handle.stderr.take(),
        StreamKind::Stdin => None,
    };
    let Some(mut pipe) = pipe else {
        return;
    };
    if let Err(e) = registry.deregister(&mut pipe) {
        warn!(test = %handle.case.name(), stream = ?kind, error = %e, "failed to deregister pipe");
    }
    drop(pipe);
    if let Some(buffer) = handle.buffer_mut(kind) {
        buffer.close();
    }
    *remaining -= 1;
    debug!(
        test = %handle.case.name(),
        stream = ?kind,
        remaining = *remaining,
        "stream reached EOF"
    );
}

/// Deregisters and closes the stdin pipe, which delivers EOF to the child.
pub(crate) fn close_stdin(registry: &Registry, handle: &mut ProcessHandle<'_>) {
    let Some(mut feed) = handle.stdin.take() else {
        return;
    };
    if let Err(e) = registry.deregister(&mut feed.pipe) {
        warn!(test = %handle.case.name(), error = %e, "failed to deregister stdin pipe");
    }
    let unwritten = feed.remaining().len();
    if unwritten > 0 {
        debug!(
            test = %handle.case.name(),
            unwritten,
            "closing stdin before the whole payload was read"
        );
    }
}

impl Drop for RunSession<'_> {
    fn drop(&mut self) {
        for handle in self.handles.iter_mut() {
            if handle.status.is_some() {
                continue;
            }
            if let Some(child) = handle.child.as_mut() {
                let _ = process::kill_process_group(child.id());
                let _ = child.wait();
            }
        }
    }
}
