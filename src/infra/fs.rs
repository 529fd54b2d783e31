//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides utilities for file system operations in test
//! directories, such as creating sparse ("holey") files.
//!
//! 此模块提供测试目录中的文件系统操作，例如创建稀疏（"有洞"）文件。

use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::core::error::HarnessError;

/// Creates (or truncates) a sparse file of exactly `size` bytes.
///
/// Only the last byte is written; the range before it is a hole that reads
/// back as zeroes and, on filesystems that support holes, is not allocated.
///
/// # Arguments
/// * `path` - Path of the file to create
/// * `size` - Logical size of the file in bytes
///
/// 创建（或截断）一个恰好 `size` 字节的稀疏文件。只写入最后一个字节。
pub fn create_holey_file(path: &Path, size: u64) -> Result<PathBuf, HarnessError> {
    let io_err = |source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(io_err)?;

    if size > 0 {
        file.seek(SeekFrom::Start(size - 1)).map_err(io_err)?;
        file.write_all(&[0]).map_err(io_err)?;
    }

    Ok(path.to_path_buf())
}

/// Creates `dir` and all of its parents.
pub fn ensure_dir(dir: &Path) -> Result<(), HarnessError> {
    fs::create_dir_all(dir).map_err(|source| HarnessError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
