//! # Console Reporting Module / 控制台报告模块
//!
//! Prints a colourful, formatted summary of a run.
//!
//! 打印一次运行的彩色格式化摘要。

use colored::*;

use crate::core::testcase::TestOutcome;
use crate::infra::t;

/// Prints a formatted summary of test outcomes to the console.
///
/// # Output Format / 输出格式
/// ```text
/// --- Test Summary ---
///   - PASS     | obj_critnib/TEST0                        |      0.02s
///   - FAILED   | obj_critnib/TEST1                        |      1.01s
///   - SKIP     | obj_critnib/TEST2                        |        N/A
/// ```
pub fn print_summary(outcomes: &[TestOutcome]) {
    println!("\n{}", t!("test_summary_banner").bold());

    for outcome in outcomes {
        let duration_str = outcome
            .duration()
            .map(|d| format!("{:.2?}", d))
            .unwrap_or_else(|| "N/A".to_string());

        let status = status_str(outcome);
        let status_colored = match outcome {
            TestOutcome::Passed { .. } => status.green(),
            TestOutcome::Failed { .. } => status.red(),
            TestOutcome::Skipped { .. } => status.dimmed(),
        };

        println!(
            "  - {:<8} | {:<40} | {:>10}",
            status_colored,
            outcome.name(),
            duration_str
        );
    }

    let (passed, failed, skipped) = count(outcomes);
    println!(
        "\n{}",
        t!("summary_counts", passed = passed, failed = failed, skipped = skipped)
    );
}

/// Localized status label of an outcome.
pub fn status_str(outcome: &TestOutcome) -> String {
    match outcome {
        TestOutcome::Passed { .. } => t!("status_passed").to_string(),
        TestOutcome::Failed { .. } => t!("status_failed").to_string(),
        TestOutcome::Skipped { .. } => t!("status_skipped").to_string(),
    }
}

/// Number of passed, failed and skipped outcomes.
pub fn count(outcomes: &[TestOutcome]) -> (usize, usize, usize) {
    outcomes
        .iter()
        .fold((0, 0, 0), |(p, f, s), outcome| match outcome {
            TestOutcome::Passed { .. } => (p + 1, f, s),
            TestOutcome::Failed { .. } => (p, f + 1, s),
            TestOutcome::Skipped { .. } => (p, f, s + 1),
        })
}
