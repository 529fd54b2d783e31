mod common;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

use common::Project;

fn runner() -> Command {
    let mut cmd = Command::cargo_bin("pmtest-runner").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

/// `init` writes the default configuration file and refuses to overwrite it.
///
/// `init` 写入默认配置文件，并拒绝覆盖已存在的文件。
#[test]
fn test_init_creates_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("testconfig.toml");

    runner()
        .args(["--lang", "en", "init", "-o"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("timeout_secs = 180"));

    runner()
        .args(["--lang", "en", "init", "-o"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("File already exists"));
}

/// A test sequence that matches no test case ends the run with an error.
///
/// 没有匹配任何测试用例的测试序列会以错误结束运行。
#[test]
fn test_empty_selection_fails() {
    let project = Project::new();
    project.suite("[[tests]]\ngroup = \"obj_basic\"\ntestnum = 0\n");
    project.config("test_sequence = [7]");

    runner()
        .current_dir(project.root())
        .args(["--lang", "en", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "No testcases to run found for selected configuration.",
        ));
}

/// A missing suite file is reported as an error.
/// 缺失的套件文件会被报告为错误。
#[test]
fn test_missing_suite_fails() {
    let project = Project::new();

    runner()
        .current_dir(project.root())
        .args(["--lang", "en", "run", "-s", "absent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load test suite"));
}

/// Unknown variant names are rejected by the argument parser.
/// 未知的变体名称会被参数解析器拒绝。
#[test]
fn test_unknown_build_is_rejected() {
    runner()
        .args(["--lang", "en", "run", "-b", "fastest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fastest"));
}

/// A passing binary gives a successful run and a summary.
///
/// 通过的二进制文件使运行成功，并输出摘要。
#[cfg(unix)]
#[test]
fn test_successful_run() {
    let project = Project::new();
    project.binary("obj_basic", "[ \"$1\" = \"t\" ] || exit 1");
    project.suite(
        r#"
        [[tests]]
        group = "obj_basic"
        testnum = 0
        args = "t"

        [[tests]]
        group = "obj_basic"
        testnum = 1
        args = "t"
        test_type = "long"
        "#,
    );
    project.config("");

    runner()
        .current_dir(project.root())
        .args(["--lang", "en", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("obj_basic/TEST0: PASS"))
        .stdout(predicate::str::contains("obj_basic/TEST1: SKIP"))
        .stdout(predicate::str::contains("Passed: 1, Failed: 0, Skipped: 1"));
}

/// A failing binary fails the run but the remaining tests still run.
///
/// 失败的二进制文件会使运行失败，但其余测试仍会执行。
#[cfg(unix)]
#[test]
fn test_failing_run_continues() {
    let project = Project::new();
    project.binary("obj_fail", "echo \"pool corrupted\"\nexit 1");
    project.binary("obj_ok", "exit 0");
    project.suite(
        r#"
        [[tests]]
        group = "obj_fail"
        testnum = 0

        [[tests]]
        group = "obj_ok"
        testnum = 1
        "#,
    );
    project.config("");

    runner()
        .current_dir(project.root())
        .args(["--lang", "en", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("obj_fail/TEST0: FAILED"))
        .stderr(predicate::str::contains("pool corrupted"))
        .stdout(predicate::str::contains("obj_ok/TEST1: PASS"))
        .stdout(predicate::str::contains("Passed: 1, Failed: 1, Skipped: 0"));
}

/// The test sequence given on the command line selects and orders tests.
///
/// 命令行给出的测试序列会选择测试并决定其顺序。
#[cfg(unix)]
#[test]
fn test_sequence_override() {
    let project = Project::new();
    project.binary("obj_seq", "exit 0");
    project.suite(
        r#"
        [[tests]]
        group = "obj_seq"
        testnum = 0

        [[tests]]
        group = "obj_seq"
        testnum = 1

        [[tests]]
        group = "obj_seq"
        testnum = 2
        "#,
    );
    project.config("");

    let output = runner()
        .current_dir(project.root())
        .args(["--lang", "en", "run", "-u", "2,0"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let second = stdout.find("obj_seq/TEST2: PASS").unwrap();
    let first = stdout.find("obj_seq/TEST0: PASS").unwrap();
    assert!(second < first);
    assert!(!stdout.contains("obj_seq/TEST1"));
}
