use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use pmtest_runner::config::{Config, EnvConfig};
use pmtest_runner::core::testcase::{EnvMap, Execute, FailureReason, TestCase, TestOutcome};
use pmtest_runner::driver::{exit_code, run_selected, select_testcases};

/// A test case whose outcome is fixed in advance. It records the order in
/// which the driver ran it.
///
/// 结果预先确定的测试用例，并记录驱动运行它的顺序。
struct Scripted<'a> {
    testnum: u32,
    label: &'static str,
    fails: bool,
    log: &'a Mutex<Vec<String>>,
    testdir: PathBuf,
    utenv: EnvMap,
}

impl<'a> Scripted<'a> {
    fn new(testnum: u32, label: &'static str, fails: bool, log: &'a Mutex<Vec<String>>) -> Self {
        Self {
            testnum,
            label,
            fails,
            log,
            testdir: PathBuf::from(format!("scripted{testnum}")),
            utenv: BTreeMap::new(),
        }
    }
}

impl TestCase for Scripted<'_> {
    fn testnum(&self) -> u32 {
        self.testnum
    }

    fn name(&self) -> String {
        format!("scripted/TEST{}{}", self.testnum, self.label)
    }

    fn testdir(&self) -> &Path {
        &self.testdir
    }

    fn cwd(&self) -> &Path {
        Path::new(".")
    }

    fn utenv(&self) -> &EnvMap {
        &self.utenv
    }
}

impl Execute for Scripted<'_> {
    async fn execute(&self, _config: &Config, _env_config: &EnvConfig) -> TestOutcome {
        self.log.lock().unwrap().push(self.name());
        if self.fails {
            TestOutcome::Failed {
                name: self.name(),
                reason: FailureReason::ExitCode,
                output: "unexpected exit".to_string(),
                duration: Duration::ZERO,
            }
        } else {
            TestOutcome::Passed {
                name: self.name(),
                duration: Duration::ZERO,
                contexts: 1,
            }
        }
    }
}

fn numbers(cases: &[Scripted<'_>]) -> Vec<(u32, &'static str)> {
    cases.iter().map(|c| (c.testnum, c.label)).collect()
}

/// Without a sequence every case is kept in declaration order.
/// 没有序列时，所有用例按声明顺序保留。
#[test]
fn test_no_sequence_keeps_everything() {
    let log = Mutex::new(Vec::new());
    let cases = vec![
        Scripted::new(2, "", false, &log),
        Scripted::new(0, "", false, &log),
        Scripted::new(1, "", false, &log),
    ];

    let selected = select_testcases(cases, &[]);
    assert_eq!(numbers(&selected), vec![(2, ""), (0, ""), (1, "")]);
}

/// A sequence filters and reorders the cases; ties keep their order.
/// 序列会过滤并重新排序用例；编号相同的用例保持原有顺序。
#[test]
fn test_sequence_filters_and_orders() {
    let log = Mutex::new(Vec::new());
    let cases = vec![
        Scripted::new(0, "a", false, &log),
        Scripted::new(1, "", false, &log),
        Scripted::new(2, "", false, &log),
        Scripted::new(0, "b", false, &log),
        Scripted::new(3, "", false, &log),
    ];

    let selected = select_testcases(cases, &[3, 0, 1, 3]);
    assert_eq!(
        numbers(&selected),
        vec![(3, ""), (0, "a"), (0, "b"), (1, "")]
    );
}

/// A sequence naming no existing case selects nothing.
/// 序列中没有任何已存在的用例时，不会选中任何用例。
#[test]
fn test_sequence_without_matches_is_empty() {
    let log = Mutex::new(Vec::new());
    let cases = vec![Scripted::new(0, "", false, &log)];
    assert!(select_testcases(cases, &[7]).is_empty());
}

/// Cases run one after another, and a failure does not stop the run.
/// 用例依次运行，失败不会中止整个运行。
#[tokio::test]
async fn test_run_continues_after_failure() {
    let log = Mutex::new(Vec::new());
    let cases = vec![
        Scripted::new(0, "", false, &log),
        Scripted::new(1, "", true, &log),
        Scripted::new(2, "", false, &log),
    ];
    let config = Config::default();
    let env_config = EnvConfig::fallback();

    let outcomes = run_selected(&cases, &config, &env_config).await;

    assert_eq!(
        *log.lock().unwrap(),
        vec!["scripted/TEST0", "scripted/TEST1", "scripted/TEST2"]
    );
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[1].is_failure());
    assert_eq!(exit_code(&outcomes), 1);
}

/// Passed and skipped outcomes give exit code 0.
/// 通过和跳过的结果对应退出码 0。
#[test]
fn test_exit_code_ignores_skips() {
    let outcomes = vec![
        TestOutcome::Passed {
            name: "a/TEST0".to_string(),
            duration: Duration::from_millis(3),
            contexts: 4,
        },
        TestOutcome::Skipped {
            name: "a/TEST1".to_string(),
            reason: "long".to_string(),
        },
    ];
    assert_eq!(exit_code(&outcomes), 0);
    assert_eq!(exit_code(&[]), 0);
}
