// ==========================================
// 参数集 - API层错误类型
// ==========================================
// 职责: 把存储/配置/快照层错误转换为调用方可处理的错误
// 要求: 错误信息必须带路径与原因，便于重试或放弃
// ==========================================

use crate::config::ConfigError;
use crate::repository::{BatchOperation, RecordFailure, StoreError};
use crate::snapshot::SnapshotError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("参数不存在: {0}")]
    NotFound(String),

    // ==========================================
    // 存储错误
    // ==========================================
    #[error("存储配置错误: {0}")]
    ConfigError(String),

    #[error("参数读取失败: {0}")]
    RetrievalFailed(String),

    #[error("批量{operation}失败: {} 条", .failures.len())]
    BatchFailed {
        operation: BatchOperation,
        failures: Vec<RecordFailure>,
    },

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    // ==========================================
    // 工作流错误
    // ==========================================
    #[error("快照处理失败: {0}")]
    SnapshotFailed(String),

    #[error("迁移部分失败: 已删除 {deleted} 条, 已写入 {written} 条; {}", .errors.join("; "))]
    PromotionFailed {
        deleted: usize,
        written: usize,
        errors: Vec<String>,
    },

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 StoreError 转换
// ==========================================
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Config(e) => ApiError::ConfigError(e.to_string()),
            StoreError::DatabaseConnectionError(msg) => ApiError::ConfigError(msg),
            StoreError::LockError(msg) => {
                ApiError::InternalError(format!("存储锁获取失败: {}", msg))
            }
            StoreError::NotFound { path } => ApiError::NotFound(path),
            StoreError::Retrieval { path, cause } => {
                ApiError::RetrievalFailed(format!("path={}: {}", path, cause))
            }
            StoreError::InvalidPath(path) => {
                ApiError::InvalidInput(format!("无效的参数路径: {}", path))
            }
            StoreError::RedactedValue(path) => {
                ApiError::InvalidInput(format!("拒绝写入脱敏占位值: {}", path))
            }
            err @ StoreError::UnknownKind { .. } => ApiError::RetrievalFailed(err.to_string()),
            StoreError::Batch {
                operation,
                failures,
            } => ApiError::BatchFailed {
                operation,
                failures,
            },
            StoreError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            StoreError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<SnapshotError> for ApiError {
    fn from(err: SnapshotError) -> Self {
        ApiError::SnapshotFailed(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
