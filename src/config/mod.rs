// ==========================================
// 参数集 - 配置层
// ==========================================
// 职责: 存储配置加载（默认值 / 环境变量 / JSON 文件）
// ==========================================

pub mod error;
pub mod store_config;

// 重导出
pub use error::{ConfigError, ConfigResult};
pub use store_config::{default_db_path, StoreConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
