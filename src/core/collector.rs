//! # Output Collector Module / 输出收集模块
//!
//! The event loop. A single thread waits on the readiness multiplexer and, for
//! every ready pipe, drains child output into its bounded buffer or pushes the
//! next slice of the stdin payload. The loop ends when every output stream of
//! every process has reached EOF and every stdin payload was delivered or
//! refused by its reader.
//!
//! 事件循环。单个线程等待就绪多路复用器，对每个就绪的管道，
//! 将子进程输出读入其有界缓冲区，或写入 stdin 负载的下一段。
//! 当所有输出流都到达 EOF 且所有 stdin 负载都已投递（或被读端拒绝）时循环结束。

use anyhow::{Context, Result};
use mio::Events;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::core::launcher::StreamKind;
use crate::core::session::{self, RunSession};

/// Maximum readiness events handled per wake.
const MAX_EVENTS: usize = 64;

/// Size of the scratch buffer used for each read.
const SCRATCH_SIZE: usize = 1024;

/// Reads from one stream per wake before the loop looks at deadlines again.
/// A stream cut short is revisited on the next pass.
const MAX_READS_PER_WAKE: usize = 64;

/// Blocks until every output stream in the session has reached EOF (or was
/// abandoned after its process was killed) and every stdin payload is done.
///
/// The multiplexer is edge-triggered, so each ready pipe is read until it would
/// block, over several passes when it holds more than one read budget.
/// Per-stream byte order is preserved because all reads of a stream happen
/// sequentially on this thread.
pub fn collect(session: &mut RunSession<'_>) -> Result<()> {
    let mut events = Events::with_capacity(MAX_EVENTS);
    let mut scratch = [0u8; SCRATCH_SIZE];
    // Streams left readable when their read budget ran out. No new edge will
    // arrive for them, so they are revisited without blocking.
    let mut backlog: Vec<(usize, StreamKind)> = Vec::new();

    while session.has_pending_io() {
        let timeout = if backlog.is_empty() {
            session.next_timeout(Instant::now())
        } else {
            Some(Duration::ZERO)
        };
        if let Err(e) = session.poll.poll(&mut events, timeout) {
            if e.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(e).context("Failed to wait for process output");
        }

        let mut next_backlog = Vec::new();
        let ready = events
            .iter()
            .map(|event| session::decode_token(event.token()))
            .chain(backlog.drain(..));
        for (index, kind) in ready {
            match kind {
                StreamKind::Stdin => feed_stdin(session, index),
                StreamKind::Stdout | StreamKind::Stderr => {
                    if drain_output(session, index, kind, &mut scratch) == Drain::Paused
                        && !next_backlog.contains(&(index, kind))
                    {
                        next_backlog.push((index, kind));
                    }
                }
            }
        }
        backlog = next_backlog;

        session.enforce_deadlines(Instant::now());
    }

    debug!("all pipes closed");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Drain {
    /// The pipe would block or was closed.
    Done,
    /// The read budget ran out with data possibly still waiting.
    Paused,
}

fn drain_output(
    session: &mut RunSession<'_>,
    index: usize,
    kind: StreamKind,
    scratch: &mut [u8],
) -> Drain {
    let RunSession {
        poll,
        handles,
        remaining,
        ..
    } = session;
    let Some(handle) = handles.get_mut(index) else {
        return Drain::Done;
    };

    let mut reads = 0;
    loop {
        if reads == MAX_READS_PER_WAKE {
            return Drain::Paused;
        }
        // A stale event for a stream closed earlier in this batch.
        let Some(pipe) = handle.receiver_mut(kind) else {
            return Drain::Done;
        };
        match pipe.read(scratch) {
            Ok(0) => break,
            Ok(n) => {
                reads += 1;
                if let Some(buffer) = handle.buffer_mut(kind) {
                    buffer.append(&scratch[..n]);
                }
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Drain::Done,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(
                    test = %handle.case.name(),
                    stream = ?kind,
                    error = %e,
                    "read failed; treating as EOF"
                );
                break;
            }
        }
    }

    session::close_output(poll.registry(), handle, kind, remaining);
    Drain::Done
}

fn feed_stdin(session: &mut RunSession<'_>, index: usize) {
    let RunSession { poll, handles, .. } = session;
    let Some(handle) = handles.get_mut(index) else {
        return;
    };
    let Some(feed) = handle.stdin.as_mut() else {
        return;
    };

    let payload = feed.payload;
    while feed.written < payload.len() {
        match feed.pipe.write(&payload[feed.written..]) {
            Ok(0) => break,
            Ok(n) => feed.written += n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                // Usually EPIPE: the child exited or closed stdin without reading everything.
                debug!(test = %handle.case.name(), error = %e, "stdin closed by the child");
                break;
            }
        }
    }

    session::close_stdin(poll.registry(), handle);
}
