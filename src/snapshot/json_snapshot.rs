// ==========================================
// 参数集 - JSON 快照
// ==========================================
// 格式: 参数记录数组 [{path, value, kind, version}, ...]
// ==========================================

use crate::domain::{Param, ParamSet};
use crate::snapshot::error::{SnapshotError, SnapshotResult};
use std::path::Path;

/// 序列化为 JSON 字符串（带缩进）
pub fn to_json(set: &ParamSet) -> SnapshotResult<String> {
    Ok(serde_json::to_string_pretty(set.params())?)
}

/// 从 JSON 字符串解析
pub fn from_json(raw: &str) -> SnapshotResult<ParamSet> {
    let params: Vec<Param> = serde_json::from_str(raw)?;
    Ok(ParamSet::from_params(params))
}

pub fn read_json<P: AsRef<Path>>(path: P) -> SnapshotResult<ParamSet> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SnapshotError::FileNotFound(path.display().to_string()));
    }
    from_json(&std::fs::read_to_string(path)?)
}

pub fn write_json<P: AsRef<Path>>(set: &ParamSet, path: P) -> SnapshotResult<()> {
    std::fs::write(path, to_json(set)?)?;
    Ok(())
}
