// Shared test helpers for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// Writes an executable shell script to `dir/name`.
///
/// 在 `dir/name` 写入一个可执行的 shell 脚本。
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir).expect("Failed to create script directory");
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make script executable");
    path
}

/// A temporary test tree: a suite root holding one directory per test group,
/// and a `fs` directory standing in for the non-pmem filesystem.
///
/// 临时测试目录树：套件根目录（每个测试组一个子目录）以及充当非 pmem 文件系统的 `fs` 目录。
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempdir().expect("Failed to create temporary directory");
        fs::create_dir_all(dir.path().join("fs")).expect("Failed to create fs directory");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn fs_dir(&self) -> PathBuf {
        self.root().join("fs")
    }

    /// Adds the binary of `group`, implemented as a shell script.
    #[cfg(unix)]
    pub fn binary(&self, group: &str, body: &str) -> PathBuf {
        write_script(&self.root().join(group), group, body)
    }

    /// Writes `TestSuite.toml` into the root.
    pub fn suite(&self, content: &str) -> PathBuf {
        let path = self.root().join("TestSuite.toml");
        fs::write(&path, content).expect("Failed to write suite file");
        path
    }

    /// Writes `testconfig.toml` selecting the debug build on the non-pmem
    /// filesystem, followed by `extra` lines.
    pub fn config(&self, extra: &str) -> PathBuf {
        let path = self.root().join("testconfig.toml");
        let content = format!(
            "build = [\"debug\"]\nfs = [\"nonpmem\"]\nnon_pmem_fs_dir = '{}'\nunittest_log_level = 1\n{extra}\n",
            self.fs_dir().display()
        );
        fs::write(&path, content).expect("Failed to write config file");
        path
    }
}
