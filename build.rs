//! # Build Script for Internationalization / 国际化构建脚本
//!
//! Checks at compile time that every translation file in `locales/` defines
//! exactly the keys of the base language file (`en.toml`). Nested tables are
//! flattened to dotted keys (`[report] status_passed` becomes
//! `report.status_passed`), the same way `rust-i18n` looks them up.
//!
//! 在编译时检查 `locales/` 中的每个翻译文件是否恰好定义了基础语言文件
//! （`en.toml`）中的所有键。嵌套表会被展平为点分键
//! （`[report] status_passed` 变为 `report.status_passed`），与 `rust-i18n` 的查找方式一致。

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Collects every string leaf of a TOML table as a dotted key.
///
/// 将 TOML 表中的每个字符串叶子节点收集为点分键。
fn flatten_keys(prefix: &str, table: &toml::Table, keys: &mut BTreeSet<String>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten_keys(&full_key, inner, keys),
            _ => {
                keys.insert(full_key);
            }
        }
    }
}

fn load_keys(path: &Path) -> BTreeSet<String> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    let table: toml::Table = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()));
    let mut keys = BTreeSet::new();
    flatten_keys("", &table, &mut keys);
    keys
}

/// 1. Read the base language file (en.toml) and collect its keys
/// 2. Compare every other `.toml` file in `locales/` against it
/// 3. Fail the build listing missing keys; warn about extra ones
///
/// 1. 读取基础语言文件（en.toml）并收集其键
/// 2. 将 `locales/` 中其他每个 `.toml` 文件与之比较
/// 3. 缺少键时使构建失败并列出缺失的键；多余的键只发出警告
fn main() {
    println!("cargo:rerun-if-changed=locales/");

    let locales_dir = Path::new("locales");
    let base_keys = load_keys(&locales_dir.join("en.toml"));

    let lang_files: Vec<PathBuf> = fs::read_dir(locales_dir)
        .unwrap_or_else(|e| panic!("Failed to read locales directory: {e}"))
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml"))
        .filter(|path| path.file_stem().and_then(|s| s.to_str()) != Some("en"))
        .collect();

    let mut problems = Vec::new();
    for path in &lang_files {
        let keys = load_keys(path);
        let missing: Vec<_> = base_keys.difference(&keys).cloned().collect();
        if !missing.is_empty() {
            problems.push(format!("{} is missing: {}", path.display(), missing.join(", ")));
        }
        for extra in keys.difference(&base_keys) {
            println!(
                "cargo:warning=Key '{extra}' in {} not found in base (en.toml).",
                path.display()
            );
        }
    }

    if !problems.is_empty() {
        panic!("Incomplete translations:\n{}", problems.join("\n"));
    }
}
