//! # Commands Module / 命令模块
//!
//! - `run` - Runs a test suite under a configuration
//! - `init` - Writes a default configuration file
//!
//! - `run` - 在配置下运行测试套件
//! - `init` - 写入默认配置文件

pub mod init;
pub mod run;
