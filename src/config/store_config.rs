// ==========================================
// 参数集 - 存储配置
// ==========================================
// 职责: 存储连接路径、分页大小、解密开关的加载与校验
// 来源: 默认值 < JSON 配置文件 / 环境变量
// 红线: 配置错误必须返回给调用方，不得静默回退
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 环境变量: 数据库路径
pub const ENV_DB_PATH: &str = "PARAMSET_DB_PATH";
/// 环境变量: 列举分页大小
pub const ENV_PAGE_SIZE: &str = "PARAMSET_PAGE_SIZE";
/// 环境变量: 列举时是否解密
pub const ENV_WITH_DECRYPTION: &str = "PARAMSET_WITH_DECRYPTION";

/// 默认分页大小（与远端参数存储单页上限一致）
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// 分页大小上限
pub const MAX_PAGE_SIZE: usize = 50;

// ==========================================
// StoreConfig - 存储配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: String,        // SQLite 文件路径，":memory:" 表示内存库
    pub page_size: usize,       // fetch_by_path 每页条数
    pub with_decryption: bool,  // fetch_by_path 是否返回 SecureString 明文
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            page_size: DEFAULT_PAGE_SIZE,
            with_decryption: true,
        }
    }
}

impl StoreConfig {
    /// 指定数据库路径，其余取默认值
    pub fn with_db_path(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            page_size: DEFAULT_PAGE_SIZE,
            with_decryption: true,
        }
    }

    /// 从环境变量加载（未设置的项取默认值）
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载，便于测试时不触碰进程环境
    ///
    /// 只读取 lookup；来源中没有数据库路径时才解析用户数据目录
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup(ENV_DB_PATH) {
            Some(path) => {
                let trimmed = path.trim();
                if trimmed.is_empty() {
                    return Err(invalid(ENV_DB_PATH, &path, "路径不能为空"));
                }
                trimmed.to_string()
            }
            None => data_dir_db_path(),
        };

        let mut config = Self::with_db_path(db_path);

        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            config.page_size = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid(ENV_PAGE_SIZE, &raw, &e.to_string()))?;
        }

        if let Some(raw) = lookup(ENV_WITH_DECRYPTION) {
            config.with_decryption = parse_bool(&raw)
                .ok_or_else(|| invalid(ENV_WITH_DECRYPTION, &raw, "期望 true/false"))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 配置文件加载（缺省字段取默认值）
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let config: StoreConfig =
            serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// 校验配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.db_path.trim().is_empty() {
            return Err(invalid("db_path", &self.db_path, "路径不能为空"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(invalid(
                "page_size",
                &self.page_size.to_string(),
                &format!("取值范围 1..={}", MAX_PAGE_SIZE),
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 PARAMSET_DB_PATH > 用户数据目录 > 当前目录
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    data_dir_db_path()
}

// 用户数据目录下的数据库文件；目录不可用时回退到当前目录
fn data_dir_db_path() -> String {
    let mut path = PathBuf::from("./paramset.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("paramset");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("paramset.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_lookup_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, " /tmp/params.db "),
            (ENV_PAGE_SIZE, "25"),
            (ENV_WITH_DECRYPTION, "off"),
        ]))
        .expect("valid config");

        assert_eq!(config.db_path, "/tmp/params.db");
        assert_eq!(config.page_size, 25);
        assert!(!config.with_decryption);
    }

    #[test]
    fn test_lookup_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, ":memory:")]))
            .expect("valid config");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.with_decryption);
    }

    #[test]
    fn test_lookup_ignores_process_environment() {
        // 路径完全由 lookup 决定
        let config = StoreConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "/tmp/only-lookup.db")]))
            .expect("valid config");
        assert_eq!(config.db_path, "/tmp/only-lookup.db");

        // lookup 中没有路径时取数据目录默认值，而不是进程环境变量
        let config = StoreConfig::from_lookup(lookup_from(&[])).expect("valid config");
        assert_eq!(config.db_path, data_dir_db_path());
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = StoreConfig::from_lookup(lookup_from(&[(ENV_PAGE_SIZE, "ten")]))
            .expect_err("page size must be numeric");
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_PAGE_SIZE));

        let err = StoreConfig::from_lookup(lookup_from(&[(ENV_PAGE_SIZE, "0")]))
            .expect_err("page size must be positive");
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "page_size"));

        let err = StoreConfig::from_lookup(lookup_from(&[(ENV_WITH_DECRYPTION, "maybe")]))
            .expect_err("bool must parse");
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        assert!(StoreConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "  ")])).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "db_path": ":memory:", "page_size": 3 }}"#).expect("write config");

        let config = StoreConfig::from_json_file(file.path()).expect("load config");
        assert_eq!(config.db_path, ":memory:");
        assert_eq!(config.page_size, 3);
        assert!(config.with_decryption);
    }

    #[test]
    fn test_from_json_file_errors() {
        let err = StoreConfig::from_json_file("/nonexistent/paramset.json")
            .expect_err("missing file");
        assert!(matches!(err, ConfigError::FileReadError { .. }));

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write config");
        let err = StoreConfig::from_json_file(file.path()).expect_err("bad json");
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
