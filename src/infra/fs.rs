//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides utilities for file system operations: resolving the
//! program under test, reading stdin payloads and writing report files.
//!
//! 此模块提供文件系统操作的实用功能：
//! 解析被测程序路径、读取 stdin 负载以及写入报告文件。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves the program under test.
///
/// `~` and `$VARS` are expanded first. A relative path that contains a `/`
/// (e.g. `./target/myprog`) is joined to `base_dir`; a bare name is kept as is
/// and looked up on `PATH` at launch time.
///
/// 解析被测程序。先展开 `~` 和 `$VARS`；包含 `/` 的相对路径会拼接到 `base_dir`，
/// 裸名称保持不变，在启动时通过 `PATH` 查找。
///
/// # Arguments
/// * `raw` - Path as written in the suite file or on the command line
/// * `base_dir` - Directory relative paths are resolved against
pub fn resolve_binary(raw: &str, base_dir: &Path) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Failed to expand binary path: {raw}"))?;
    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() || !expanded.contains('/') {
        Ok(path)
    } else {
        Ok(base_dir.join(path))
    }
}

/// Reads a file whose bytes are sent verbatim as a test's stdin.
pub fn read_stdin_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read stdin file: {}", path.display()))
}

/// Writes a report, creating missing parent directories.
///
/// # Arguments
/// * `path` - Destination file
/// * `contents` - Rendered report
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write report: {}", path.display()))
}

/// Returns the directory containing `file`, or `.` for a bare file name.
pub fn parent_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
