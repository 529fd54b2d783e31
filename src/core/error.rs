//! # Harness Errors / 测试框架错误
//!
//! Typed failures raised by the core. The CLI layer wraps them in
//! `anyhow::Error` with additional context.
//!
//! 核心模块产生的类型化错误。CLI 层会用 `anyhow::Error` 包装并补充上下文。

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::core::variant::Axis;

/// Errors produced while selecting contexts and executing test binaries.
///
/// # Invariants
/// - `TestFailed` is a per-test failure; the driver moves on to the next test.
/// - `Timeout` ends the current test invocation; nothing is retried.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A configuration or test definition named a variant that does not exist.
    #[error("unknown {axis} variant '{name}'")]
    UnknownVariant { axis: Axis, name: String },

    /// An attribute was read that the filesystem variant does not provide.
    #[error("fs '{attribute}' attribute cannot be used for '{fs}' fs")]
    ProhibitedAttribute {
        attribute: &'static str,
        fs: &'static str,
    },

    /// The test binary exited with an unexpected code.
    #[error("{test}: FAILED\n{output}")]
    TestFailed { test: String, output: String },

    /// The test binary did not finish within the configured timeout.
    #[error("'{}' timed out after {timeout:?}", cmd.display())]
    Timeout { cmd: PathBuf, timeout: Duration },

    /// The test binary could not be started or waited on.
    #[error("failed to run '{}': {source}", cmd.display())]
    Spawn {
        cmd: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file operation in the test directory failed.
    #[error("i/o error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    /// Output captured from the test binary, when the error carries any.
    pub fn output(&self) -> Option<&str> {
        match self {
            HarnessError::TestFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}
