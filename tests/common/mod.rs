// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

use func_runner::{TestCase, TestCaseBuilder};

pub const SH: &str = "/bin/sh";
pub const CAT: &str = "/bin/cat";
pub const ECHO: &str = "/bin/echo";

/// A case that runs `script` with `/bin/sh -c`. The runner's binary must be [`SH`].
pub fn sh_case(name: &str, script: &str) -> TestCaseBuilder {
    TestCase::builder(name).args(["-c", script])
}

pub fn build(builder: TestCaseBuilder) -> TestCase {
    builder.build().expect("test case should be valid")
}

pub fn temp_workspace() -> TempDir {
    tempdir().expect("Failed to create temporary directory")
}

/// Writes a suite file named `FuncTests.toml` into `dir`.
pub fn write_suite(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("FuncTests.toml");
    fs::write(&path, content).expect("Failed to write suite file");
    path
}

/// Helper function to create an invalid TOML configuration
pub fn create_invalid_toml(dir: &Path) -> PathBuf {
    write_suite(
        dir,
        r#"
binary = "/bin/cat"
# Invalid TOML - missing closing bracket
[[cases]
name = "invalid-case"
"#,
    )
}
