//! # Configuration Module / 配置模块
//!
//! Process-wide settings of a run. A `Config` is built once (from a TOML
//! file or from `Config::default()`), adjusted by command-line overrides
//! and then only handed out by shared reference.
//!
//! 一次运行的全局设置。`Config` 只构建一次（来自 TOML 文件或 `Config::default()`），
//! 经命令行覆盖后只以共享引用的方式传递。

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::variant::{BuildKind, FsKind, TestType, Variant, expand};

/// Default name of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "testconfig.toml";
/// Default name of the optional environment configuration file.
pub const DEFAULT_ENV_CONFIG_FILE: &str = "envconfig.toml";

/// Global settings of a test run.
/// 测试运行的全局设置。
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Build variants to run. Composites are expanded on use.
    pub build: Vec<BuildKind>,
    /// Filesystem variants to run.
    pub fs: Vec<FsKind>,
    /// Duration classes to run.
    pub test_type: Vec<TestType>,
    /// Timeout of a single test binary invocation, in seconds.
    pub timeout_secs: u64,
    /// 0: silent, 1: normal, 2: verbose (binary output on success).
    pub unittest_log_level: u8,
    /// Directory on a persistent-memory aware filesystem.
    pub pmem_fs_dir: String,
    /// Directory on a regular filesystem.
    pub non_pmem_fs_dir: String,
    /// Force the library to treat `pmem_fs_dir` as persistent memory.
    pub fs_dir_force_pmem: bool,
    /// Explicit ordered list of test numbers to run. Empty runs every test.
    pub test_sequence: Vec<u32>,
    /// Root of the test tree; build output directories are resolved from it.
    pub root_dir: PathBuf,
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    pub language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build: BuildKind::all().to_vec(),
            fs: FsKind::all().to_vec(),
            test_type: vec![TestType::Check],
            timeout_secs: 180,
            unittest_log_level: 2,
            pmem_fs_dir: String::new(),
            non_pmem_fs_dir: String::new(),
            fs_dir_force_pmem: false,
            test_sequence: Vec::new(),
            root_dir: PathBuf::from("."),
            language: "en".to_string(),
        }
    }
}

impl Config {
    /// Expanded build variants.
    pub fn builds(&self) -> Vec<BuildKind> {
        expand(&[self.build.as_slice()])
    }

    /// Expanded filesystem variants.
    pub fn filesystems(&self) -> Vec<FsKind> {
        expand(&[self.fs.as_slice()])
    }

    /// Expanded duration classes.
    pub fn test_types(&self) -> Vec<TestType> {
        expand(&[self.test_type.as_slice()])
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolves a relative `root_dir` against `base`, the directory holding
    /// the test tree. Absolute roots are kept.
    pub fn anchor_root(&mut self, base: &Path) {
        if self.root_dir.is_relative() {
            self.root_dir = base.join(&self.root_dir);
        }
    }

    /// Directory layout of the build tree below `root_dir`.
    pub fn layout(&self) -> Layout {
        Layout::new(&self.root_dir)
    }
}

/// Loads a configuration from a TOML file.
///
/// # Arguments
/// * `path` - Path to the configuration file
///
/// # Returns
/// The parsed `Config`, with defaults for every missing key
pub fn load_config(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Settings of the host environment that are not part of a test configuration.
/// 不属于测试配置的宿主环境设置。
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnvConfig {
    /// Extra directory appended to the library search path of every binary.
    #[serde(rename = "GLOBAL_LIB_PATH", alias = "global_lib_path")]
    pub global_lib_path: String,
}

impl EnvConfig {
    /// Values used when no environment configuration file exists.
    pub fn fallback() -> Self {
        Self::default()
    }
}

/// Loads the environment configuration from a TOML file.
pub fn load_env_config(path: &Path) -> Result<EnvConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read env config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse env config file: {}", path.display()))
}

/// Locations of the build output relative to the test tree.
/// 构建产物相对于测试目录树的位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub debug_libdir: PathBuf,
    pub nondebug_libdir: PathBuf,
    /// Separate executable directories exist on Windows only.
    pub debug_exedir: Option<PathBuf>,
    pub nondebug_exedir: Option<PathBuf>,
}

impl Layout {
    pub fn new(root: &Path) -> Self {
        let root = absolute(root);
        let parent = root.join("..");

        #[cfg(windows)]
        {
            let debug_builddir = parent.join("x64").join("Debug");
            let nondebug_builddir = parent.join("x64").join("Release");
            Self {
                debug_libdir: debug_builddir.join("libs"),
                nondebug_libdir: nondebug_builddir.join("libs"),
                debug_exedir: Some(debug_builddir.join("tests")),
                nondebug_exedir: Some(nondebug_builddir.join("tests")),
                root,
            }
        }

        #[cfg(not(windows))]
        {
            Self {
                debug_libdir: parent.join("debug"),
                nondebug_libdir: parent.join("nondebug"),
                debug_exedir: None,
                nondebug_exedir: None,
                root,
            }
        }
    }
}

/// Expands `~` and environment variables and makes the path absolute.
/// Paths that cannot be expanded are used as written.
pub fn resolve_dir(raw: &str) -> PathBuf {
    let expanded = shellexpand::full(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    absolute(Path::new(&expanded))
}

/// Makes `path` absolute against the current directory. An empty path
/// stands for the current directory itself.
fn absolute(path: &Path) -> PathBuf {
    if path.as_os_str().is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
