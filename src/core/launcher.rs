//! # Process Launcher Module / 进程启动模块
//!
//! Turns one [`TestCase`] into one running child process whose three standard
//! streams are wired to non-blocking pipes owned by a [`ProcessHandle`].
//!
//! 将一个 [`TestCase`] 转换为一个正在运行的子进程，
//! 其三个标准流连接到由 [`ProcessHandle`] 拥有的非阻塞管道。

use anyhow::{Context, Result};
use mio::unix::pipe::{Receiver, Sender};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::core::buffer::OutputBuffer;
use crate::core::case::TestCase;
use crate::infra::process;

/// Why the harness stopped a process before it finished on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    TimedOut,
    Cancelled,
}

/// Which standard stream a pipe is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdin,
    Stdout,
    Stderr,
}

/// The stdin payload still to be delivered to a child.
#[derive(Debug)]
pub struct StdinFeed<'a> {
    pub(crate) pipe: Sender,
    pub(crate) payload: &'a [u8],
    pub(crate) written: usize,
}

impl StdinFeed<'_> {
    pub(crate) fn remaining(&self) -> &[u8] {
        &self.payload[self.written..]
    }
}

/// One launched test process and everything the harness owns for it.
///
/// Pipe fields become `None` once the corresponding stream is closed; the
/// child becomes reaped once `status` is set.
#[derive(Debug)]
pub struct ProcessHandle<'a> {
    pub(crate) index: usize,
    pub(crate) case: &'a TestCase,
    pub(crate) child: Option<Child>,
    pub(crate) launch_error: Option<String>,
    pub(crate) stdin: Option<StdinFeed<'a>>,
    pub(crate) stdout: Option<Receiver>,
    pub(crate) stderr: Option<Receiver>,
    pub(crate) stdout_buf: OutputBuffer,
    pub(crate) stderr_buf: OutputBuffer,
    pub(crate) started: Instant,
    pub(crate) timeout: Option<Duration>,
    pub(crate) deadline: Option<Instant>,
    pub(crate) termination: Option<Termination>,
    pub(crate) status: Option<ExitStatus>,
    pub(crate) finished: Option<Instant>,
}

impl<'a> ProcessHandle<'a> {
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    /// `true` while stdout or stderr is still open.
    pub fn has_open_streams(&self) -> bool {
        self.stdout.is_some() || self.stderr.is_some()
    }

    /// `true` while the harness still has work for this process: output to
    /// drain or stdin bytes to deliver.
    pub fn is_active(&self) -> bool {
        self.has_open_streams() || self.stdin.is_some()
    }

    pub(crate) fn buffer_mut(&mut self, kind: StreamKind) -> Option<&mut OutputBuffer> {
        match kind {
            StreamKind::Stdout => Some(&mut self.stdout_buf),
            StreamKind::Stderr => Some(&mut self.stderr_buf),
            StreamKind::Stdin => None,
        }
    }

    pub(crate) fn receiver_mut(&mut self, kind: StreamKind) -> Option<&mut Receiver> {
        match kind {
            StreamKind::Stdout => self.stdout.as_mut(),
            StreamKind::Stderr => self.stderr.as_mut(),
            StreamKind::Stdin => None,
        }
    }

    /// Kills the process group and records why. The deadline moves to the end
    /// of the grace period during which already-written output can still drain.
    pub(crate) fn terminate(&mut self, reason: Termination, grace_deadline: Instant) {
        match self.pid() {
            Some(pid) if self.status.is_none() => {
                debug!(test = %self.case.name(), pid, ?reason, "killing process group");
                if let Err(e) = process::kill_process_group(pid) {
                    warn!(
                        test = %self.case.name(),
                        pid,
                        error = %e,
                        "failed to kill process group"
                    );
                }
            }
            _ => {}
        }
        self.termination.get_or_insert(reason);
        self.deadline = Some(grace_deadline);
    }

    fn exec_failed(index: usize, case: &'a TestCase, error: String, capacity: usize) -> Self {
        let now = Instant::now();
        let mut stdout_buf = OutputBuffer::new(capacity);
        let mut stderr_buf = OutputBuffer::new(capacity);
        stdout_buf.close();
        stderr_buf.close();
        Self {
            index,
            case,
            child: None,
            launch_error: Some(error),
            stdin: None,
            stdout: None,
            stderr: None,
            stdout_buf,
            stderr_buf,
            started: now,
            timeout: None,
            deadline: None,
            termination: None,
            status: None,
            finished: Some(now),
        }
    }
}

/// Launches `binary` with the case's arguments, returning a handle whose output
/// pipes are non-blocking and whose stdin payload is queued for the collector.
///
/// A program image that cannot be executed is not an error: the handle records
/// the failure and reports the reserved exit code. Running out of pipes or
/// processes is an error and aborts the run.
///
/// 使用用例参数启动 `binary`。程序映像无法执行不视为错误，
/// 而管道或进程资源耗尽会中止整个运行。
pub fn launch<'a>(
    index: usize,
    case: &'a TestCase,
    binary: &Path,
    capacity: usize,
) -> Result<ProcessHandle<'a>> {
    let mut cmd = Command::new(binary);
    cmd.args(case.args())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    process::set_process_group(&mut cmd);

    let started = Instant::now();
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if process::is_exec_failure(&e) => {
            warn!(
                test = %case.name(),
                binary = %binary.display(),
                error = %e,
                "could not execute program"
            );
            return Ok(ProcessHandle::exec_failed(index, case, e.to_string(), capacity));
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!(
                    "Failed to launch '{}' for test '{}'",
                    binary.display(),
                    case.name()
                )
            });
        }
    };

    match wire_pipes(&mut child, case) {
        Ok((stdin, stdout, stderr)) => {
            debug!(test = %case.name(), pid = child.id(), "launched");
            Ok(ProcessHandle {
                index,
                case,
                child: Some(child),
                launch_error: None,
                stdin,
                stdout: Some(stdout),
                stderr: Some(stderr),
                stdout_buf: OutputBuffer::new(capacity),
                stderr_buf: OutputBuffer::new(capacity),
                started,
                timeout: None,
                deadline: None,
                termination: None,
                status: None,
                finished: None,
            })
        }
        Err(e) => {
            let _ = process::kill_process_group(child.id());
            let _ = child.wait();
            Err(e.context(format!("Failed to set up pipes for test '{}'", case.name())))
        }
    }
}

type Pipes<'a> = (Option<StdinFeed<'a>>, Receiver, Receiver);

fn wire_pipes<'a>(child: &mut Child, case: &'a TestCase) -> Result<Pipes<'a>> {
    let stdin = child.stdin.take().context("child stdin was not piped")?;
    let stdout = child.stdout.take().context("child stdout was not piped")?;
    let stderr = child.stderr.take().context("child stderr was not piped")?;

    let stdout = Receiver::from(stdout);
    stdout.set_nonblocking(true)?;
    let stderr = Receiver::from(stderr);
    stderr.set_nonblocking(true)?;

    // Nothing to send: dropping the write end delivers EOF right away.
    let stdin = if case.stdin().is_empty() {
        drop(stdin);
        None
    } else {
        let pipe = Sender::from(stdin);
        pipe.set_nonblocking(true)?;
        Some(StdinFeed {
            pipe,
            payload: case.stdin(),
            written: 0,
        })
    };

    Ok((stdin, stdout, stderr))
}
