//! # Execution Context Module / 执行上下文模块
//!
//! Resolved build and filesystem variants, and the per-invocation `Context`
//! that merges their environment and runs test binaries in it.
//!
//! 已解析的构建和文件系统变体，以及每次调用的 `Context`：
//! 它合并这些变体的环境变量并在其中运行测试二进制文件。

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::core::config::{Config, EnvConfig, Layout, resolve_dir};
use crate::core::error::HarnessError;
use crate::core::testcase::{EnvMap, TestCase};
use crate::core::variant::{BuildKind, FsKind, Variant, expand};
use crate::infra::command::{exit_code, spawn_and_capture};
use crate::infra::fs as test_fs;
use crate::infra::message::Message;

/// Name of the dynamic library search path variable.
#[cfg(windows)]
pub const LIB_PATH_VAR: &str = "PATH";
#[cfg(not(windows))]
pub const LIB_PATH_VAR: &str = "LD_LIBRARY_PATH";

#[cfg(windows)]
const PATH_SEP: &str = ";";
#[cfg(not(windows))]
const PATH_SEP: &str = ":";

/// Variables forced on by the pmem filesystem variant.
pub const PMEM_FORCE_VAR: &str = "PMEM_IS_PMEM_FORCE";

/// A variant that may add variables to the environment of a test binary.
/// 可以向测试二进制文件的环境中添加变量的变体。
pub trait EnvOverlay {
    /// Variables to add. Empty when the variant adds none.
    fn env(&self) -> EnvMap;
}

/// A build variant resolved against the directory layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Build {
    pub kind: BuildKind,
    /// Directory holding the libraries of this build.
    pub libdir: PathBuf,
    /// Directory holding the test executables (Windows only).
    pub exedir: Option<PathBuf>,
    /// Suffix appended to executable names.
    pub exesuffix: &'static str,
    /// Extra variables of this build. Empty for the standard builds.
    pub env: EnvMap,
}

impl Build {
    pub fn new(kind: BuildKind, layout: &Layout) -> Self {
        let (libdir, exedir, exesuffix) = match kind {
            BuildKind::Debug => (&layout.debug_libdir, &layout.debug_exedir, ""),
            BuildKind::Nondebug => (&layout.nondebug_libdir, &layout.nondebug_exedir, ""),
            BuildKind::StaticDebug => (&layout.debug_libdir, &None, ".static-debug"),
            BuildKind::StaticNondebug => (&layout.nondebug_libdir, &None, ".static-nondebug"),
        };
        Self {
            kind,
            libdir: libdir.clone(),
            exedir: exedir.clone(),
            exesuffix,
            env: EnvMap::new(),
        }
    }

    /// Instantiates every build variant the groups expand to.
    pub fn factory(layout: &Layout, groups: &[&[BuildKind]]) -> Vec<Self> {
        expand(groups)
            .into_iter()
            .map(|kind| Self::new(kind, layout))
            .collect()
    }
}

impl EnvOverlay for Build {
    fn env(&self) -> EnvMap {
        self.env.clone()
    }
}

/// A filesystem variant resolved against the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fs {
    pub kind: FsKind,
    dir: Option<PathBuf>,
    env: EnvMap,
}

impl Fs {
    pub fn new(kind: FsKind, config: &Config) -> Self {
        let mut env = EnvMap::new();
        let dir = match kind {
            FsKind::Pmem => {
                if config.fs_dir_force_pmem {
                    env.insert(PMEM_FORCE_VAR.to_string(), "1".to_string());
                }
                Some(resolve_dir(&config.pmem_fs_dir))
            }
            FsKind::Nonpmem => Some(resolve_dir(&config.non_pmem_fs_dir)),
            FsKind::Non => None,
        };
        Self { kind, dir, env }
    }

    /// Instantiates every filesystem variant the groups expand to.
    pub fn factory(config: &Config, groups: &[&[FsKind]]) -> Vec<Self> {
        expand(groups)
            .into_iter()
            .map(|kind| Self::new(kind, config))
            .collect()
    }

    /// Directory of this filesystem.
    ///
    /// # Errors
    /// `HarnessError::ProhibitedAttribute` for the `non` filesystem, which has
    /// no directory at all.
    pub fn directory(&self) -> Result<&Path, HarnessError> {
        self.dir
            .as_deref()
            .ok_or_else(|| HarnessError::ProhibitedAttribute {
                attribute: "dir",
                fs: self.kind.name(),
            })
    }

    /// `true` when the variant provides a directory.
    pub fn has_directory(&self) -> bool {
        self.dir.is_some()
    }
}

impl EnvOverlay for Fs {
    fn env(&self) -> EnvMap {
        self.env.clone()
    }
}

/// The merged execution environment of one test invocation in one
/// (filesystem, build) combination.
///
/// 一次测试调用在某个（文件系统，构建）组合下的合并执行环境。
pub struct Context<'a> {
    /// Variables of the filesystem variant overridden by the build variant's.
    pub env: EnvMap,
    pub test: &'a dyn TestCase,
    pub config: &'a Config,
    pub env_config: &'a EnvConfig,
    pub build: &'a Build,
    pub fs: &'a Fs,
    pub msg: Message,
}

impl<'a> Context<'a> {
    pub fn new(
        test: &'a dyn TestCase,
        config: &'a Config,
        env_config: &'a EnvConfig,
        fs: &'a Fs,
        build: &'a Build,
    ) -> Self {
        let mut env = EnvMap::new();
        let overlays: [&dyn EnvOverlay; 2] = [fs, build];
        for overlay in overlays {
            env.extend(overlay.env());
        }

        Self {
            env,
            test,
            config,
            env_config,
            build,
            fs,
            msg: Message::new(config),
        }
    }

    /// Test directory on the selected filesystem.
    ///
    /// # Errors
    /// Fails for the `non` filesystem, see [`Fs::directory`].
    pub fn testdir(&self) -> Result<PathBuf, HarnessError> {
        Ok(self.fs.directory()?.join(self.test.testdir()))
    }

    /// Creates a sparse file of `size` bytes named `name` in the test directory.
    pub fn create_holey_file(&self, size: u64, name: &str) -> Result<PathBuf, HarnessError> {
        let path = self.testdir()?.join(name);
        test_fs::create_holey_file(&path, size)
    }

    /// Builds the environment of a child process.
    ///
    /// Layers, later ones winning: the context's merged variables, `inherited`
    /// (normally the runner's own environment), the test's `utenv`. The
    /// library search variable is then prefixed with the build's library
    /// directory and the global library path.
    pub fn assemble_env<I>(&self, inherited: I) -> EnvMap
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut env = self.env.clone();
        env.extend(inherited);
        env.extend(self.test.utenv().iter().map(|(k, v)| (k.clone(), v.clone())));

        let existing = env.get(LIB_PATH_VAR).cloned().unwrap_or_default();
        let lib_path = [
            self.build.libdir.to_string_lossy().into_owned(),
            self.env_config.global_lib_path.clone(),
            existing,
        ]
        .join(PATH_SEP);
        env.insert(LIB_PATH_VAR.to_string(), lib_path);

        env
    }

    /// Path of the executable `cmd` for the current build.
    pub fn resolve_executable(&self, cmd: &str) -> PathBuf {
        let mut name = OsString::from(cmd);
        name.push(self.build.exesuffix);

        if cfg!(windows) {
            name.push(".exe");
            let exedir = self
                .build
                .exedir
                .as_deref()
                .unwrap_or_else(|| self.test.cwd());
            exedir.join(name)
        } else {
            self.test.cwd().join(name)
        }
    }

    /// Executes the binary `cmd` with the single argument `args`.
    ///
    /// The exit code is compared with `expected_exit`. On a mismatch the test
    /// is failed with the captured output; on a match the output is printed
    /// at the verbose level and returned.
    ///
    /// # Errors
    /// - `TestFailed` (through [`TestCase::fail`]) on an exit code mismatch
    /// - `Timeout` when the binary outlives `config.timeout_secs`; it is killed
    /// - `Spawn` when the binary cannot be started
    pub async fn exec(&self, cmd: &str, args: &str, expected_exit: i32) -> Result<String, HarnessError> {
        let program = self.resolve_executable(cmd);
        let env = self.assemble_env(std::env::vars());

        let mut command = tokio::process::Command::new(&program);
        command
            .arg(args)
            .env_clear()
            .envs(&env)
            .current_dir(self.test.cwd())
            .kill_on_drop(true);

        let timeout = self.config.timeout();
        let (status, output) = tokio::time::timeout(timeout, spawn_and_capture(command))
            .await
            .map_err(|_| HarnessError::Timeout {
                cmd: program.clone(),
                timeout,
            })?;
        let status = status.map_err(|source| HarnessError::Spawn {
            cmd: program.clone(),
            source,
        })?;

        if exit_code(&status) != expected_exit {
            return Err(self.test.fail(output));
        }

        self.msg.print_verbose(&output);
        Ok(output)
    }
}
