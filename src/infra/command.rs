//! # Command Execution Module / 命令执行模块
//!
//! Spawns child processes and captures their combined output.
//!
//! 派生子进程并捕获其合并输出。

use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::infra::t;

/// Spawns a command, captures its stdout and stderr.
/// The output streams are read concurrently and combined line by line into
/// a single string, in the order the lines arrive.
///
/// # Arguments
/// * `cmd` - The `tokio::process::Command` to execute.
///
/// # Returns
/// A tuple containing:
/// - The `ExitStatus` of the process wrapped in an `io::Result`.
/// - The combined stdout and stderr as a `String`.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 输出流被并发读取，并按到达顺序逐行合并到一个字符串中。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
) -> (std::io::Result<ExitStatus>, String) {
    let mut child = match cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return (Err(e), String::new()),
    };

    let Some(stdout) = child.stdout.take() else {
        return (
            Err(std::io::Error::other(t!("capture_stdout_failed").to_string())),
            String::new(),
        );
    };
    let Some(stderr) = child.stderr.take() else {
        return (
            Err(std::io::Error::other(t!("capture_stderr_failed").to_string())),
            String::new(),
        );
    };

    // Both readers append to the same buffer.
    // 两个读取任务写入同一个缓冲区。
    let output = Arc::new(tokio::sync::Mutex::new(String::new()));
    let stdout_handle = tokio::spawn(collect_lines(stdout, Arc::clone(&output)));
    let stderr_handle = tokio::spawn(collect_lines(stderr, Arc::clone(&output)));

    let status = child.wait().await;

    // Wait for the readers so that no trailing output is lost.
    // 等待读取任务结束，以确保不丢失末尾的输出。
    if let Err(e) = stdout_handle.await {
        eprintln!("{}", t!("join_stdout_failed", error = e));
    }
    if let Err(e) = stderr_handle.await {
        eprintln!("{}", t!("join_stderr_failed", error = e));
    }

    let captured = output.lock().await.clone();
    (status, captured)
}

/// Drains `stream` to the end. Lines that are not valid UTF-8 are kept
/// lossily; reading only stops at EOF or a read error.
async fn collect_lines<R>(stream: R, output: Arc<tokio::sync::Mutex<String>>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if buf.last() != Some(&b'\n') {
                    buf.push(b'\n');
                }
                let mut output = output.lock().await;
                output.push_str(&String::from_utf8_lossy(&buf));
            }
        }
    }
}

/// Exit code of a finished process.
///
/// A process terminated by a signal has no exit code; it is reported as the
/// negated signal number, `-1` when even that is unknown.
pub fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_both_streams() {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c").arg("echo out; echo err 1>&2; exit 3");

        let (status, output) = spawn_and_capture(cmd).await;
        let status = status.unwrap();

        assert_eq!(exit_code(&status), 3);
        assert!(output.contains("out\n"));
        assert!(output.contains("err\n"));
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_stop_draining() {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c").arg(
            "echo start; printf '\\377\\376 bad\\n'; \
             i=0; while [ $i -lt 50000 ]; do echo line$i; i=$((i+1)); done; \
             echo tail_marker; exit 0",
        );

        let (status, output) = spawn_and_capture(cmd).await;

        assert_eq!(exit_code(&status.unwrap()), 0);
        assert!(output.contains("start\n"));
        assert!(output.contains("\u{FFFD}\u{FFFD} bad\n"));
        assert!(output.contains("line49999\n"));
        assert!(output.contains("tail_marker\n"));
    }

    #[tokio::test]
    async fn missing_program_reports_spawn_error() {
        let cmd = tokio::process::Command::new("/nonexistent/definitely_not_here");
        let (status, output) = spawn_and_capture(cmd).await;
        assert!(status.is_err());
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn signal_exit_is_negated() {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c").arg("kill -9 $$");

        let (status, _) = spawn_and_capture(cmd).await;
        assert_eq!(exit_code(&status.unwrap()), -9);
    }
}
