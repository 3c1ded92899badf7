// ==========================================
// 参数集 - 参数存储层
// ==========================================
// 红线: Repository 不含集合代数，只做取/存/删
// ==========================================
// 职责: 提供参数存储接口及本地实现，屏蔽存储细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod memory_store;
pub mod param_store;
pub mod sqlite_store;

// 重导出
pub use error::{BatchOperation, RecordFailure, StoreError, StoreResult};
pub use memory_store::MemoryParamStore;
pub use param_store::{
    validate_path, validate_prefix, validate_record, ParamStore, REDACTED_VALUE,
};
pub use sqlite_store::SqliteParamStore;
