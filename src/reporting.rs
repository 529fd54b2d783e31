//! # Reporting Module / 报告模块
//!
//! This module prints the end-of-run summary of test outcomes to the
//! console, with colour and internationalization support.
//!
//! 此模块在控制台打印运行结束时的测试结果摘要，支持彩色输出和国际化。

pub mod console;

// Re-export common reporting functions
pub use console::print_summary;
