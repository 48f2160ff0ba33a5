//! # Process Utilities Module / 进程工具模块
//!
//! Thin Unix helpers around process groups, signals and exit statuses.
//!
//! 围绕进程组、信号和退出状态的轻量 Unix 辅助函数。

use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{Command, ExitStatus};

use crate::core::models::SIGNAL_EXIT_CODE;

/// Puts the child in its own process group so it can be killed with its descendants.
pub fn set_process_group(cmd: &mut Command) {
    cmd.process_group(0);
}

/// Sends `SIGKILL` to the whole process group led by `pid`.
/// A group that is already gone is not an error.
pub fn kill_process_group(pid: u32) -> io::Result<()> {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("pid {pid} out of range"),
        ));
    };
    // SAFETY: kill(2) with a negative pid only signals that process group.
    let ret = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if ret == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(err)
    }
}

/// Maps an exit status to `(exit_code, signal)`.
/// A normal exit yields its 0-255 code; signal death yields [`SIGNAL_EXIT_CODE`].
pub fn exit_code_of(status: ExitStatus) -> (i32, Option<i32>) {
    match status.code() {
        Some(code) => (code, None),
        None => (SIGNAL_EXIT_CODE, status.signal()),
    }
}

/// Returns `true` when a spawn error means the program image itself could not
/// be executed, as opposed to the system running out of pipes or processes.
pub fn is_exec_failure(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    ) || matches!(
        err.raw_os_error(),
        Some(libc::ENOEXEC) | Some(libc::ENOTDIR) | Some(libc::EISDIR) | Some(libc::ELOOP)
    )
}
