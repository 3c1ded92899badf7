// ==========================================
// 参数集 - 存储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 批量写入/删除收集全部单条失败，一次性报告
// ==========================================

use crate::config::ConfigError;
use std::fmt;
use thiserror::Error;

// ==========================================
// 批量操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    Save,
    Delete,
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchOperation::Save => write!(f, "写入"),
            BatchOperation::Delete => write!(f, "删除"),
        }
    }
}

/// 单条记录失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub path: String,
    pub cause: String,
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.cause)
    }
}

/// 存储层错误类型
#[derive(Error, Debug)]
pub enum StoreError {
    // ===== 构造/配置错误 =====
    #[error("存储配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("存储锁获取失败: {0}")]
    LockError(String),

    // ===== 读取错误 =====
    #[error("参数不存在: path={path}")]
    NotFound { path: String },

    #[error("参数读取失败 (path={path}): {cause}")]
    Retrieval { path: String, cause: String },

    #[error("无效的参数路径: {0}")]
    InvalidPath(String),

    #[error("拒绝写入脱敏占位值 (path={0})，请以解密方式读取后再写入")]
    RedactedValue(String),

    #[error("未知的参数类型标记 (path={path}): {marker}")]
    UnknownKind { path: String, marker: String },

    // ===== 写入/删除错误 =====
    #[error("批量{operation}失败 {} 条: {}", .failures.len(), format_failures(.failures))]
    Batch {
        operation: BatchOperation,
        failures: Vec<RecordFailure>,
    },

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    /// 批量操作中失败的路径
    pub fn failed_paths(&self) -> Vec<&str> {
        match self {
            StoreError::Batch { failures, .. } => failures.iter().map(|f| f.path.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

fn format_failures(failures: &[RecordFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => StoreError::DatabaseQueryError(msg),
            _ => StoreError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type StoreResult<T> = Result<T, StoreError>;
