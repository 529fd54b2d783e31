//! # Test Suite Module / 测试套件模块
//!
//! Declarative test cases that run one binary with one argument string and
//! expect one exit code, loaded from a TOML suite file.
//!
//! 声明式测试用例：以一个参数字符串运行一个二进制文件并期望一个退出码，
//! 从 TOML 套件文件中加载。

use anyhow::{Context as _, Result};
use colored::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::core::config::{Config, EnvConfig, Layout};
use crate::core::context::{Build, Context, Fs};
use crate::core::error::HarnessError;
use crate::core::filter::{Selection, test_type_selected};
use crate::core::testcase::{EnvMap, Execute, FailureReason, TestCase, TestOutcome};
use crate::core::variant::{BuildKind, FsKind, TestType};
use crate::infra::fs::ensure_dir;
use crate::infra::message::Message;
use crate::infra::t;

/// Default name of the suite file.
pub const DEFAULT_SUITE_FILE: &str = "TestSuite.toml";

/// Placeholder name of the test directory in `args`.
pub const TESTDIR_VAR: &str = "TESTDIR";

/// Substitutes `${TESTDIR}` and `${<holey file name>}` in an argument string.
///
/// Placeholders without a value, such as `${TESTDIR}` on the `non`
/// filesystem, are left as written.
///
/// 替换参数字符串中的 `${TESTDIR}` 和 `${<稀疏文件名>}`；没有值的占位符保持原样。
pub fn expand_args(args: &str, paths: &EnvMap) -> String {
    shellexpand::env_with_context_no_errors(args, |name| paths.get(name)).into_owned()
}

/// A sparse file to create in the test directory before the binary runs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct HoleyFile {
    pub name: String,
    pub size: u64,
}

/// One test entry as written in the suite file.
/// 套件文件中的一个测试条目。
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestSpec {
    /// Test group; also the directory holding the binary.
    pub group: String,
    pub testnum: u32,
    /// Binary name, defaults to the group name.
    #[serde(default)]
    pub cmd: Option<String>,
    /// Single argument string. `${TESTDIR}` and `${<holey file name>}`
    /// are replaced by the paths created for the current context.
    #[serde(default)]
    pub args: String,
    #[serde(default)]
    pub expected_exit: i32,
    #[serde(default = "default_test_type")]
    pub test_type: TestType,
    #[serde(default)]
    pub build: Selection<BuildKind>,
    #[serde(default)]
    pub fs: Selection<FsKind>,
    #[serde(default)]
    pub utenv: EnvMap,
    #[serde(default)]
    pub holey_files: Vec<HoleyFile>,
}

fn default_test_type() -> TestType {
    TestType::Short
}

#[derive(Debug, Deserialize)]
struct SuiteFile {
    #[serde(default)]
    tests: Vec<TestSpec>,
}

/// A test case that runs a single binary in every selected context.
#[derive(Debug, Clone)]
pub struct BinaryTest {
    pub spec: TestSpec,
    cwd: PathBuf,
    testdir: PathBuf,
    utenv: EnvMap,
}

impl BinaryTest {
    /// Creates the test relative to the suite root directory.
    pub fn new(spec: TestSpec, suite_root: &Path) -> Self {
        let cwd = suite_root.join(&spec.group);
        let testdir = PathBuf::from(format!("{}{}", spec.group, spec.testnum));
        let utenv = spec.utenv.clone();
        Self {
            spec,
            cwd,
            testdir,
            utenv,
        }
    }

    pub fn cmd(&self) -> &str {
        self.spec.cmd.as_deref().unwrap_or(&self.spec.group)
    }

    /// Build and filesystem variants this test runs in under `config`.
    pub fn contexts(&self, config: &Config) -> (Vec<BuildKind>, Vec<FsKind>) {
        (
            self.spec.build.resolve(&config.builds()),
            self.spec.fs.resolve(&config.filesystems()),
        )
    }

    /// Runs the binary in one (fs, build) combination.
    async fn run_in(
        &self,
        config: &Config,
        env_config: &EnvConfig,
        fs: &Fs,
        build: &Build,
    ) -> Result<(), HarnessError> {
        let ctx = Context::new(self, config, env_config, fs, build);

        let mut paths = EnvMap::new();
        if fs.has_directory() {
            let testdir = ctx.testdir()?;
            ensure_dir(&testdir)?;
            paths.insert(TESTDIR_VAR.to_string(), testdir.display().to_string());
        }
        for file in &self.spec.holey_files {
            let path = ctx.create_holey_file(file.size, &file.name)?;
            paths.insert(file.name.clone(), path.display().to_string());
        }

        let args = expand_args(&self.spec.args, &paths);
        ctx.exec(self.cmd(), &args, self.spec.expected_exit)
            .await
            .map(|_| ())
    }

    fn skipped(&self, msg: &Message, reason: String) -> TestOutcome {
        msg.print(
            t!("test_skipped", name = self.name(), reason = &reason)
                .to_string()
                .dimmed(),
        );
        TestOutcome::Skipped {
            name: self.name(),
            reason,
        }
    }
}

impl TestCase for BinaryTest {
    fn testnum(&self) -> u32 {
        self.spec.testnum
    }

    fn name(&self) -> String {
        format!("{}/TEST{}", self.spec.group, self.spec.testnum)
    }

    fn testdir(&self) -> &Path {
        &self.testdir
    }

    fn cwd(&self) -> &Path {
        &self.cwd
    }

    fn utenv(&self) -> &EnvMap {
        &self.utenv
    }
}

impl Execute for BinaryTest {
    async fn execute(&self, config: &Config, env_config: &EnvConfig) -> TestOutcome {
        let msg = Message::new(config);

        if !test_type_selected(&config.test_type, self.spec.test_type) {
            return self.skipped(&msg, self.spec.test_type.to_string());
        }

        let (builds, filesystems) = self.contexts(config);
        if builds.is_empty() || filesystems.is_empty() {
            return self.skipped(&msg, t!("no_matching_context").to_string());
        }

        let layout: Layout = config.layout();
        let builds = Build::factory(&layout, &[builds.as_slice()]);
        let filesystems = Fs::factory(config, &[filesystems.as_slice()]);

        let start = Instant::now();
        let mut contexts = 0;
        for fs in &filesystems {
            for build in &builds {
                msg.print(
                    t!(
                        "test_setup",
                        name = self.name(),
                        test_type = self.spec.test_type,
                        fs = fs.kind,
                        build = build.kind
                    )
                    .to_string()
                    .blue(),
                );

                let ctx_start = Instant::now();
                if let Err(err) = self.run_in(config, env_config, fs, build).await {
                    return self.failed(&msg, err, start.elapsed());
                }
                contexts += 1;

                msg.print(
                    t!(
                        "test_passed",
                        name = self.name(),
                        duration = format_secs(ctx_start.elapsed())
                    )
                    .to_string()
                    .green(),
                );
            }
        }

        TestOutcome::Passed {
            name: self.name(),
            duration: start.elapsed(),
            contexts,
        }
    }
}

impl BinaryTest {
    fn failed(&self, msg: &Message, err: HarnessError, duration: Duration) -> TestOutcome {
        let reason = FailureReason::from_error(&err);
        // failures are reported even when the log level is 0
        eprintln!("{}", t!("test_failed", name = self.name()).to_string().red());
        let output = match err.output() {
            Some(output) => output.to_string(),
            None => err.to_string(),
        };
        if !output.trim().is_empty() {
            eprintln!("{}", output.trim_end());
        }
        msg.print_verbose(format!("{err:?}").dimmed());

        TestOutcome::Failed {
            name: self.name(),
            reason,
            output,
            duration,
        }
    }
}

fn format_secs(duration: Duration) -> String {
    format!("{:.3} s", duration.as_secs_f64())
}

/// All binary tests declared by a suite file.
#[derive(Debug, Clone)]
pub struct TestSuite {
    pub root: PathBuf,
    pub tests: Vec<BinaryTest>,
}

impl TestSuite {
    /// Parses a suite from TOML text, resolving paths against `root`.
    pub fn from_toml(content: &str, root: &Path) -> Result<Self> {
        let file: SuiteFile = toml::from_str(content).context("Failed to parse test suite")?;
        let tests = file
            .tests
            .into_iter()
            .map(|spec| BinaryTest::new(spec, root))
            .collect();
        Ok(Self {
            root: root.to_path_buf(),
            tests,
        })
    }
}

/// Loads a suite file. Its directory becomes the suite root.
pub fn load_suite(path: &Path) -> Result<TestSuite> {
    let path = fs::canonicalize(path)
        .with_context(|| format!("Failed to resolve suite file: {}", path.display()))?;
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read suite file: {}", path.display()))?;
    let root = path.parent().unwrap_or(Path::new("."));
    TestSuite::from_toml(&content, root)
        .with_context(|| format!("Invalid suite file: {}", path.display()))
}
