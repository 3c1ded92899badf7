// ==========================================
// 参数集 - 领域模型层
// ==========================================
// 职责: 参数记录、参数类型、参数集合代数
// 红线: 不含数据访问逻辑，所有运算纯内存、不会失败
// ==========================================

pub mod param;
pub mod param_set;
pub mod types;

// 重导出核心类型
pub use param::{Param, UNSAVED_VERSION};
pub use param_set::{path_matches_prefix, ParamSet};
pub use types::ParamKind;
