//! # Test Case Module / 测试用例模块
//!
//! The interface a test case offers to execution contexts and to the
//! driver, and the outcome of running one.
//!
//! 测试用例向执行上下文和驱动提供的接口，以及运行结果。

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::core::config::{Config, EnvConfig};
use crate::core::error::HarnessError;

/// Environment variables, ordered by name.
pub type EnvMap = BTreeMap<String, String>;

/// What an execution context needs to know about the test it runs.
/// 执行上下文需要了解的测试信息。
pub trait TestCase {
    /// Number of the test within its group.
    fn testnum(&self) -> u32;

    /// Human readable name, e.g. `obj_critnib/TEST0`.
    fn name(&self) -> String;

    /// Test directory, relative to the filesystem directory.
    fn testdir(&self) -> &Path;

    /// Working directory of the test binary.
    fn cwd(&self) -> &Path;

    /// Extra environment of the test. Overrides everything else.
    fn utenv(&self) -> &EnvMap;

    /// Signals a failure of the test with the binary's captured output.
    /// The returned error ends the current test invocation.
    fn fail(&self, output: String) -> HarnessError {
        HarnessError::TestFailed {
            test: self.name(),
            output,
        }
    }
}

/// Entry point used by the driver to run a whole test case.
#[allow(async_fn_in_trait)]
pub trait Execute: TestCase {
    async fn execute(&self, config: &Config, env_config: &EnvConfig) -> TestOutcome;
}

/// Enumerates the possible reasons for a test case failure.
/// 枚举测试用例失败的可能原因。
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FailureReason {
    /// The binary exited with an unexpected code.
    ExitCode,
    /// The binary exceeded the configured timeout.
    Timeout,
    /// The test used a facility its filesystem variant does not provide.
    Prohibited,
    /// Setting up the test directory or starting the binary failed.
    Io,
}

impl FailureReason {
    pub fn from_error(err: &HarnessError) -> Self {
        match err {
            HarnessError::TestFailed { .. } => FailureReason::ExitCode,
            HarnessError::Timeout { .. } => FailureReason::Timeout,
            HarnessError::ProhibitedAttribute { .. } => FailureReason::Prohibited,
            HarnessError::UnknownVariant { .. }
            | HarnessError::Spawn { .. }
            | HarnessError::Io { .. } => FailureReason::Io,
        }
    }
}

/// Final result of a single test case.
/// 单个测试用例的最终结果。
#[derive(Debug, Clone)]
pub enum TestOutcome {
    Passed {
        name: String,
        duration: Duration,
        /// Number of (fs, build) contexts the test ran in.
        contexts: usize,
    },
    Failed {
        name: String,
        reason: FailureReason,
        output: String,
        duration: Duration,
    },
    Skipped {
        name: String,
        reason: String,
    },
}

impl TestOutcome {
    /// The boolean-like result collected by the driver: `true` means failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, TestOutcome::Failed { .. })
    }

    pub fn name(&self) -> &str {
        match self {
            TestOutcome::Passed { name, .. }
            | TestOutcome::Failed { name, .. }
            | TestOutcome::Skipped { name, .. } => name,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            TestOutcome::Passed { duration, .. } | TestOutcome::Failed { duration, .. } => {
                Some(*duration)
            }
            TestOutcome::Skipped { .. } => None,
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestOutcome::Passed { name, .. } => write!(f, "{name}: PASS"),
            TestOutcome::Failed { name, reason, .. } => write!(f, "{name}: FAILED ({reason:?})"),
            TestOutcome::Skipped { name, reason } => write!(f, "{name}: SKIP {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Named;

    impl TestCase for Named {
        fn testnum(&self) -> u32 {
            4
        }
        fn name(&self) -> String {
            "grp/TEST4".to_string()
        }
        fn testdir(&self) -> &Path {
            Path::new("grp4")
        }
        fn cwd(&self) -> &Path {
            Path::new(".")
        }
        fn utenv(&self) -> &EnvMap {
            static EMPTY: EnvMap = BTreeMap::new();
            &EMPTY
        }
    }

    #[test]
    fn default_fail_carries_name_and_output() {
        let err = Named.fail("boom".to_string());
        assert_eq!(err.output(), Some("boom"));
        assert!(err.to_string().starts_with("grp/TEST4: FAILED"));
        assert_eq!(FailureReason::from_error(&err), FailureReason::ExitCode);
    }

    #[test]
    fn only_failures_count() {
        let passed = TestOutcome::Passed {
            name: "a".into(),
            duration: Duration::from_millis(5),
            contexts: 2,
        };
        let skipped = TestOutcome::Skipped {
            name: "b".into(),
            reason: "long".into(),
        };
        let failed = TestOutcome::Failed {
            name: "c".into(),
            reason: FailureReason::Timeout,
            output: String::new(),
            duration: Duration::from_secs(1),
        };

        assert!(!passed.is_failure());
        assert!(!skipped.is_failure());
        assert!(failed.is_failure());
        assert_eq!(skipped.duration(), None);

        let timeout = HarnessError::Timeout {
            cmd: PathBuf::from("x"),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(FailureReason::from_error(&timeout), FailureReason::Timeout);
    }
}
