//! # PMTest Runner Library / PMTest Runner 库
//!
//! This library provides the context-selection and execution layer of a test
//! harness for a persistent-memory storage library. A test case is run against
//! the cross-product of build variants (debug/nondebug/static), filesystem
//! variants (pmem/non-pmem/none) and duration classes (short/medium/long).
//!
//! 此库为持久内存存储库的测试框架提供上下文选择和执行层。
//! 测试用例会在构建变体、文件系统变体和时长类别的组合上运行。
//!
//! ## Modules / 模块
//!
//! - `core` - Variants, context filtering, execution contexts and the driver
//! - `infra` - Process capture, file helpers and the leveled logger
//! - `reporting` - Console summaries
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 变体、上下文过滤、执行上下文和驱动
//! - `infra` - 进程输出捕获、文件辅助功能和分级日志
//! - `reporting` - 控制台摘要
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::context;
pub use crate::core::driver;
pub use crate::core::variant;

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// It attempts to match the full locale (e.g., "zh-CN"), then just the language
/// code (e.g., "en"), and finally falls back to the default language ("en").
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    set_language(&locale);
}

/// Sets the active locale, falling back to the language part and then to "en".
/// 设置当前语言，依次回退到语言代码和 "en"。
pub fn set_language(locale: &str) {
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale) {
        locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
