//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which executes the test cases
//! of a suite file under the selected configuration.
//!
//! 此模块实现 `run` 命令，在选定的配置下执行套件文件中的测试用例。

use anyhow::{Context, Result};
use colored::*;
use std::path::{Path, PathBuf};

use crate::{
    core::{
        config::{self, Config, DEFAULT_CONFIG_FILE, EnvConfig},
        driver::run_tests_common,
        suite,
        variant::{BuildKind, FsKind, TestType},
    },
    infra::t,
};

/// Arguments of the `run` command.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Configuration file. `None` uses `testconfig.toml` when it exists and
    /// the default configuration otherwise.
    pub config: Option<PathBuf>,
    pub suite: PathBuf,
    /// Environment configuration file; the fallback is used when it is missing.
    pub env_config: PathBuf,
    pub build: Vec<BuildKind>,
    pub fs: Vec<FsKind>,
    pub test_type: Vec<TestType>,
    pub test_sequence: Vec<u32>,
    pub timeout_secs: Option<u64>,
    pub log_level: Option<u8>,
    pub lang: Option<String>,
}

/// Executes the run command with the provided arguments.
///
/// # Returns
/// `0` when every test passed, `1` when at least one failed
pub async fn execute(args: RunArgs) -> Result<i32> {
    let mut config = prepare_config(&args)?;
    if args.lang.is_none() {
        crate::set_language(&config.language);
    }
    let env_config = prepare_env_config(&args.env_config)?;

    let suite = suite::load_suite(&args.suite)
        .with_context(|| t!("run.suite_load_failed", path = args.suite.display()).to_string())?;
    config.anchor_root(&suite.root);

    if config.unittest_log_level >= 1 {
        println!(
            "{}",
            t!(
                "run.suite_loaded",
                path = args.suite.display(),
                count = suite.tests.len()
            )
            .cyan()
        );
        println!(
            "{}",
            t!(
                "run.selection",
                build = join(&config.builds()),
                fs = join(&config.filesystems()),
                test_type = join(&config.test_types())
            )
            .cyan()
        );
    }

    Ok(run_tests_common(suite.tests, &config, &env_config).await)
}

/// Loads the configuration and applies command-line overrides.
pub fn prepare_config(args: &RunArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            config::load_config(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, args);
    Ok(config)
}

/// Command-line values replace the ones from the configuration file.
pub fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if !args.build.is_empty() {
        config.build = args.build.clone();
    }
    if !args.fs.is_empty() {
        config.fs = args.fs.clone();
    }
    if !args.test_type.is_empty() {
        config.test_type = args.test_type.clone();
    }
    if !args.test_sequence.is_empty() {
        config.test_sequence = args.test_sequence.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        config.timeout_secs = timeout;
    }
    if let Some(level) = args.log_level {
        config.unittest_log_level = level;
    }
    if let Some(lang) = &args.lang {
        config.language = lang.clone();
    }
}

/// Loads the environment configuration, or falls back to its defaults when
/// the file does not exist.
pub fn prepare_env_config(path: &Path) -> Result<EnvConfig> {
    if path.exists() {
        config::load_env_config(path)
    } else {
        Ok(EnvConfig::fallback())
    }
}

fn join<V: std::fmt::Display>(variants: &[V]) -> String {
    variants
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
