// ==========================================
// 参数集 - 快照模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 快照模块错误类型
#[derive(Error, Debug)]
pub enum SnapshotError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件读写失败: {0}")]
    FileIoError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("JSON 解析失败: {0}")]
    JsonError(String),

    // ===== 数据映射错误 =====
    #[error("字段缺失 (行 {row}): {field}")]
    MissingField { row: usize, field: String },

    #[error("未知的参数类型 (行 {row}): {value}")]
    InvalidKind { row: usize, value: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        SnapshotError::FileIoError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for SnapshotError {
    fn from(err: csv::Error) -> Self {
        SnapshotError::CsvParseError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::JsonError(err.to_string())
    }
}

/// Result 类型别名
pub type SnapshotResult<T> = Result<T, SnapshotError>;
