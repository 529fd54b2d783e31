//! # Message Module / 消息模块
//!
//! A small level based logger bound to the configured verbosity.
//!
//! 绑定到配置中日志级别的简单分级日志器。

use std::fmt::Display;

use crate::core::config::Config;

/// Messages are printed when the configured level reaches theirs.
///
/// - level 1: regular progress lines
/// - level 2: verbose output, such as a passing binary's captured output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    level: u8,
}

impl Message {
    pub fn new(config: &Config) -> Self {
        Self::with_level(config.unittest_log_level)
    }

    pub fn with_level(level: u8) -> Self {
        Self { level }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn enabled(&self) -> bool {
        self.level >= 1
    }

    pub fn verbose_enabled(&self) -> bool {
        self.level >= 2
    }

    /// Prints `msg` at the normal level.
    pub fn print(&self, msg: impl Display) {
        if self.enabled() {
            println!("{msg}");
        }
    }

    /// Prints `msg` at the verbose level. Empty output is skipped.
    pub fn print_verbose(&self, msg: impl Display) {
        if self.verbose_enabled() {
            let text = msg.to_string();
            if !text.trim().is_empty() {
                println!("{}", text.trim_end());
            }
        }
    }
}
