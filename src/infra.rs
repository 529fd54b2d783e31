//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for the harness,
//! including process output capture, file system helpers and the
//! level based console logger.
//!
//! 此模块为测试框架提供基础设施服务，
//! 包括进程输出捕获、文件系统辅助功能和分级控制台日志。

pub mod command;
pub mod fs;
pub mod message;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
