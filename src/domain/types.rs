// ==========================================
// 参数集 - 领域类型定义
// ==========================================
// 职责: 参数类型枚举及其与存储端类型标记的互转
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 参数类型 (Parameter Kind)
// ==========================================
// 存储端类型标记: String / StringList / SecureString
// 红线: 类型不参与集合元素判等
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParamKind {
    #[default]
    String,       // 普通字符串
    StringList,   // 逗号分隔的字符串列表
    SecureString, // 加密字符串
}

impl ParamKind {
    /// 转换为存储端类型标记
    pub fn to_store_str(&self) -> &'static str {
        match self {
            ParamKind::String => "String",
            ParamKind::StringList => "StringList",
            ParamKind::SecureString => "SecureString",
        }
    }

    /// 从存储端类型标记解析
    ///
    /// # 返回
    /// - Some(ParamKind): 已知标记
    /// - None: 未知标记（由调用方决定报错方式）
    pub fn from_store_str(s: &str) -> Option<Self> {
        match s.trim() {
            "String" => Some(ParamKind::String),
            "StringList" => Some(ParamKind::StringList),
            "SecureString" => Some(ParamKind::SecureString),
            _ => None,
        }
    }

    /// 是否为加密类型
    pub fn is_encrypted(&self) -> bool {
        matches!(self, ParamKind::SecureString)
    }

    /// 由加密标志推导类型（写入时使用）
    pub fn from_encrypted_flag(encrypted: bool) -> Self {
        if encrypted {
            ParamKind::SecureString
        } else {
            ParamKind::String
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_store_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_marker_translation() {
        for kind in [ParamKind::String, ParamKind::StringList, ParamKind::SecureString] {
            assert_eq!(ParamKind::from_store_str(kind.to_store_str()), Some(kind));
        }
        assert_eq!(ParamKind::from_store_str(" SecureString "), Some(ParamKind::SecureString));
        assert_eq!(ParamKind::from_store_str("Binary"), None);
    }

    #[test]
    fn test_encrypted_flag() {
        assert!(ParamKind::SecureString.is_encrypted());
        assert!(!ParamKind::StringList.is_encrypted());
        assert_eq!(ParamKind::from_encrypted_flag(true), ParamKind::SecureString);
        assert_eq!(ParamKind::from_encrypted_flag(false), ParamKind::String);
        assert_eq!(ParamKind::default(), ParamKind::String);
    }
}
