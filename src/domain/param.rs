// ==========================================
// 参数集 - 参数记录领域模型
// ==========================================
// 职责: 单条配置/密钥参数的不可变值类型
// 红线: 集合判等只看 (path, value)，version/kind 不参与
// ==========================================

use crate::domain::types::ParamKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 新建记录的默认版本号（尚未落库）
pub const UNSAVED_VERSION: &str = "0";

// ==========================================
// Param - 参数记录
// ==========================================
// 字段私有，构造后不可变；派生的 PartialEq/Hash 为全字段比较
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    path: String,     // 层级路径，如 /cfg/beta/beth
    value: String,    // 参数值
    kind: ParamKind,  // 参数类型
    version: String,  // 版本标记（存储端递增整数的字符串形式）
}

impl Param {
    /// 创建 String 类型、未落库版本的参数记录
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            kind: ParamKind::String,
            version: UNSAVED_VERSION.to_string(),
        }
    }

    /// 以全部四个字段创建参数记录
    pub fn with_fields(
        path: impl Into<String>,
        value: impl Into<String>,
        kind: ParamKind,
        version: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
            kind,
            version: version.into(),
        }
    }

    /// 返回替换了类型的新记录
    pub fn with_kind(self, kind: ParamKind) -> Self {
        Self { kind, ..self }
    }

    /// 返回替换了版本的新记录
    pub fn with_version(self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// 集合元素键 (path, value)
    pub fn key(&self) -> (&str, &str) {
        (&self.path, &self.value)
    }

    /// 集合意义上的同一元素：path 与 value 均相等
    pub fn same_element(&self, other: &Param) -> bool {
        self.path == other.path && self.value == other.value
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 加密参数不输出明文
        if self.kind.is_encrypted() {
            write!(f, "{} = ******** ({}, v{})", self.path, self.kind, self.version)
        } else {
            write!(f, "{} = {} ({}, v{})", self.path, self.value, self.kind, self.version)
        }
    }
}
