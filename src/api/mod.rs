// ==========================================
// 参数集 - API 层
// ==========================================
// 职责: 组合存储与集合代数的工作流接口
// ==========================================

pub mod error;
pub mod param_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use param_api::{EnvDiff, ParamApi, PromotionOutcome, PromotionPlan};
