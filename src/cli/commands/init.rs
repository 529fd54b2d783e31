//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which creates a new
//! harness configuration file.
//!
//! 此模块实现 `init` 命令，用于创建新的测试框架配置文件。

use anyhow::{Context, Result};
use colored::*;
use std::{fs, path::Path};

use crate::infra::t;

/// Template written by `init`. Every key shows its default value.
pub const DEFAULT_CONFIG: &str = r#"# Test Configuration / 测试配置

# Build variants: debug, nondebug, static_debug, static_nondebug
# 构建变体
build = ["debug", "nondebug", "static_debug", "static_nondebug"]

# Filesystem variants: pmem, nonpmem, non ("non" only runs for tests that name it)
# 文件系统变体（"non" 仅在测试显式指定时运行）
fs = ["pmem", "nonpmem", "non"]

# Duration classes: short, medium, long, check (= short + medium)
# 时长类别
test_type = ["check"]

# Timeout of a single binary in seconds / 单个二进制文件的超时时间（秒）
timeout_secs = 180

# 0: silent, 1: normal, 2: verbose / 日志级别
unittest_log_level = 2

# Test directories / 测试目录
pmem_fs_dir = ""
non_pmem_fs_dir = ""
fs_dir_force_pmem = false

# Run only these test numbers, in this order / 仅按此顺序运行这些测试编号
test_sequence = []

# Root of the test tree, relative to the suite file; build output is looked up next to it
# 测试目录树的根目录（相对于套件文件）；构建产物在其旁边查找
root_dir = "."

# Language for messages / 消息语言
language = "en"
"#;

/// Executes the init command.
///
/// # Arguments
/// * `output` - Path for the new configuration file
/// * `force` - Whether to overwrite an existing file
pub fn execute(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        println!("{}", t!("init.file_exists", path = output.display()).red());
        println!("{}", t!("init.use_force").yellow());
        return Ok(());
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                t!("init.create_parent_dir_failed", path = parent.display()).to_string()
            })?;
        }
    }

    fs::write(output, DEFAULT_CONFIG)
        .with_context(|| t!("init.write_failed", path = output.display()).to_string())?;

    println!("{}", t!("init.success", path = output.display()).green());
    println!("{}", t!("init.next_steps"));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;

    // static builds do not parse on Windows
    #[cfg(not(windows))]
    #[test]
    fn template_matches_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testconfig.toml");
        fs::write(&path, "keep me").unwrap();

        execute(&path, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");

        execute(&path, true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
