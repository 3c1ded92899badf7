// ==========================================
// 参数集 - 参数集合与集合代数
// ==========================================
// 职责: 参数记录的容器，以 (path, value) 为等价关系提供集合运算
// 红线: 所有运算不修改操作数，一律返回新集合
// 红线: 容器不自动去重，len() 计入等价重复项
// ==========================================

use crate::domain::param::Param;
use std::collections::{BTreeSet, HashSet};

// ==========================================
// ParamSet - 参数集合
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ParamSet {
    params: Vec<Param>,
}

// 派生运算使用的借用索引，语义与 contains 的线性扫描一致
struct KeyIndex<'a> {
    keys: HashSet<(&'a str, &'a str)>,
}

impl<'a> KeyIndex<'a> {
    fn build(set: &'a ParamSet) -> Self {
        Self {
            keys: set.params.iter().map(Param::key).collect(),
        }
    }

    fn contains(&self, param: &Param) -> bool {
        self.keys.contains(&param.key())
    }
}

impl ParamSet {
    /// 创建空集合
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// 由记录列表创建集合（保留重复项）
    pub fn from_params(params: Vec<Param>) -> Self {
        Self { params }
    }

    /// 追加一条记录（不去重）
    pub fn insert(&mut self, param: Param) {
        self.params.push(param);
    }

    /// 集合基数（含等价重复项）
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.params.iter()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// 按路径查找第一条记录
    pub fn get(&self, path: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.path() == path)
    }

    /// 去重、排序后的路径列表
    pub fn paths(&self) -> Vec<&str> {
        self.params
            .iter()
            .map(Param::path)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    // ===== 成员与包含关系 =====

    /// 是否存在与 param 具有相同 (path, value) 的记录
    ///
    /// 线性扫描，适用于几十到几千条参数的规模
    pub fn contains(&self, param: &Param) -> bool {
        self.params.iter().any(|p| p.same_element(param))
    }

    /// self 的每条记录都在 other 中（空集是任何集合的子集）
    pub fn is_subset(&self, other: &ParamSet) -> bool {
        let index = KeyIndex::build(other);
        self.params.iter().all(|p| index.contains(p))
    }

    pub fn is_superset(&self, other: &ParamSet) -> bool {
        other.is_subset(self)
    }

    /// 成员相同即相等，不要求重复次数一致
    pub fn equals(&self, other: &ParamSet) -> bool {
        self.is_subset(other) && self.is_superset(other)
    }

    // ===== 集合运算 =====

    /// 并集
    ///
    /// 先放入 self 的全部记录，再追加 other 中 self 不包含的记录。
    /// 键冲突时保留 self 一侧的记录，不比较 version/kind。
    pub fn union(&self, other: &ParamSet) -> ParamSet {
        let index = KeyIndex::build(self);
        let mut params = Vec::with_capacity(self.len() + other.len());
        params.extend(self.params.iter().cloned());
        params.extend(other.params.iter().filter(|p| !index.contains(p)).cloned());
        ParamSet { params }
    }

    /// 交集，保留 self 一侧的记录
    pub fn intersection(&self, other: &ParamSet) -> ParamSet {
        let index = KeyIndex::build(other);
        self.params
            .iter()
            .filter(|p| index.contains(p))
            .cloned()
            .collect()
    }

    /// 差集: self 中 other 不包含的记录
    pub fn difference(&self, other: &ParamSet) -> ParamSet {
        let index = KeyIndex::build(other);
        self.params
            .iter()
            .filter(|p| !index.contains(p))
            .cloned()
            .collect()
    }

    /// 对称差: 先 self 独有，再 other 独有（顺序固定）
    pub fn symmetric_difference(&self, other: &ParamSet) -> ParamSet {
        let mut result = self.difference(other);
        result.params.extend(other.difference(self).params);
        result
    }

    // ===== 路径操作 =====

    /// 按列举语义筛选前缀下的记录
    pub fn under_prefix(&self, prefix: &str, recursive: bool) -> ParamSet {
        self.params
            .iter()
            .filter(|p| path_matches_prefix(p.path(), prefix, recursive))
            .cloned()
            .collect()
    }

    /// 把 from_prefix 下的记录改挂到 to_prefix 下，前缀外的记录丢弃
    ///
    /// 用于比较/迁移不同环境，如 /dev/app 与 /prod/app
    pub fn rebase(&self, from_prefix: &str, to_prefix: &str) -> ParamSet {
        let from = from_prefix.trim_end_matches('/');
        let to = to_prefix.trim_end_matches('/');
        self.params
            .iter()
            .filter(|p| path_matches_prefix(p.path(), from_prefix, true))
            .map(|p| {
                let rest = &p.path()[from.len()..];
                Param::with_fields(format!("{}{}", to, rest), p.value(), p.kind(), p.version())
            })
            .collect()
    }
}

/// 判断 path 是否位于 prefix 之下
///
/// - 前缀末尾的 `/` 忽略，`/` 本身表示根
/// - recursive=false 时只匹配直接子节点
pub fn path_matches_prefix(path: &str, prefix: &str, recursive: bool) -> bool {
    let base = prefix.trim_end_matches('/');
    let rest = match path.strip_prefix(base).and_then(|r| r.strip_prefix('/')) {
        Some(rest) if !rest.is_empty() => rest,
        _ => return false,
    };
    recursive || !rest.contains('/')
}

impl FromIterator<Param> for ParamSet {
    fn from_iter<I: IntoIterator<Item = Param>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl Extend<Param> for ParamSet {
    fn extend<I: IntoIterator<Item = Param>>(&mut self, iter: I) {
        self.params.extend(iter);
    }
}

impl IntoIterator for ParamSet {
    type Item = Param;
    type IntoIter = std::vec::IntoIter<Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParamSet {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}
