//! # Execution Driver Module / 执行驱动模块
//!
//! Runs the selected test cases one after another and folds their results
//! into a process exit code.
//!
//! 依次运行选中的测试用例，并将其结果汇总为进程退出码。

use colored::*;

use crate::core::config::{Config, EnvConfig};
use crate::core::testcase::{Execute, TestCase, TestOutcome};
use crate::infra::t;
use crate::reporting::console::print_summary;

/// Applies an explicit test sequence to `testcases`.
///
/// Without a sequence the cases are returned unchanged. Otherwise cases whose
/// number is not in the sequence are dropped and the rest are ordered by the
/// first position of their number in the sequence. The sort is stable, so
/// cases sharing a number keep their relative order.
///
/// 将显式的测试序列应用到 `testcases`：删除不在序列中的用例，并按序列顺序排序。
pub fn select_testcases<T: TestCase>(testcases: Vec<T>, sequence: &[u32]) -> Vec<T> {
    if sequence.is_empty() {
        return testcases;
    }

    let position = |num: u32| sequence.iter().position(|&n| n == num);
    let mut selected: Vec<(usize, T)> = testcases
        .into_iter()
        .filter_map(|tc| position(tc.testnum()).map(|pos| (pos, tc)))
        .collect();
    selected.sort_by_key(|(pos, _)| *pos);
    selected.into_iter().map(|(_, tc)| tc).collect()
}

/// Runs every selected test case sequentially and returns the exit code.
///
/// # Returns
/// `1` if any test case failed, `0` otherwise. When the selection is empty
/// the whole process exits with an error message instead of returning.
pub async fn run_tests_common<T: Execute>(
    testcases: Vec<T>,
    config: &Config,
    env_config: &EnvConfig,
) -> i32 {
    let testcases = select_testcases(testcases, &config.test_sequence);

    if testcases.is_empty() {
        eprintln!("{}", t!("no_testcases").to_string().red());
        std::process::exit(1);
    }

    let outcomes = run_selected(&testcases, config, env_config).await;

    if config.unittest_log_level >= 1 {
        print_summary(&outcomes);
    }

    exit_code(&outcomes)
}

/// Executes the given cases in order, one at a time.
pub async fn run_selected<T: Execute>(
    testcases: &[T],
    config: &Config,
    env_config: &EnvConfig,
) -> Vec<TestOutcome> {
    let mut outcomes = Vec::with_capacity(testcases.len());
    for testcase in testcases {
        outcomes.push(testcase.execute(config, env_config).await);
    }
    outcomes
}

/// `1` if any outcome is a failure, else `0`.
pub fn exit_code(outcomes: &[TestOutcome]) -> i32 {
    if outcomes.iter().any(TestOutcome::is_failure) {
        1
    } else {
        0
    }
}
