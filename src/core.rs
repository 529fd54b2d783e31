//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the harness:
//! variant axes and their expansion, context filtering, configuration,
//! execution contexts, test case definitions and the execution driver.
//!
//! 此模块包含测试框架的核心功能：
//! 变体轴及其展开、上下文过滤、配置、执行上下文、测试用例定义和执行驱动。

pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod filter;
pub mod suite;
pub mod testcase;
pub mod variant;

// Re-exports
pub use config::Config;
pub use context::Context;
pub use driver::run_tests_common;
pub use error::HarnessError;
pub use testcase::{TestCase, TestOutcome};
