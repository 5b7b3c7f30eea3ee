//! 错误类型
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 核心库错误
///
/// 单文件级别的错误（读写失败）在校验器边界被转换为 `Issue` 或 `FixReport.error`，
/// 只有 `RootNotFound` 会终止整个调用。
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("path does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid replacement table: {0}")]
    Table(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl GuardError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
