// ==========================================
// 参数集 - 核心库
// ==========================================
// 定位: 版本化配置/密钥参数的集合代数
// 技术栈: Rust + SQLite（本地存储替身）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 参数记录与集合代数
pub mod domain;

// 存储层 - 参数存取
pub mod repository;

// 配置层 - 存储配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 快照层 - CSV / JSON 文件
pub mod snapshot;

// 日志系统
pub mod logging;

// API 层 - 工作流接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{Param, ParamKind, ParamSet};

pub use repository::{MemoryParamStore, ParamStore, SqliteParamStore, StoreError, StoreResult};

pub use config::{ConfigError, StoreConfig};

pub use api::{ApiError, ApiResult, EnvDiff, ParamApi, PromotionOutcome, PromotionPlan};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "paramset";
