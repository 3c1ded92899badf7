// ==========================================
// 参数集 - CSV 快照
// ==========================================
// 格式: 表头 path,value,kind,version
// 规则: value 原样保留，其余字段去首尾空白；空行跳过；kind 缺省 String，version 缺省 "0"
// ==========================================

use crate::domain::{Param, ParamKind, ParamSet, UNSAVED_VERSION};
use crate::snapshot::error::{SnapshotError, SnapshotResult};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// CSV 表头
pub const CSV_HEADERS: [&str; 4] = ["path", "value", "kind", "version"];

/// 从 CSV 文件读取参数集合
pub fn read_csv<P: AsRef<Path>>(path: P) -> SnapshotResult<ParamSet> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SnapshotError::FileNotFound(path.display().to_string()));
    }
    let set = parse_csv(File::open(path)?)?;
    tracing::debug!(file = %path.display(), count = set.len(), "CSV 快照读取完成");
    Ok(set)
}

/// 从任意输入解析 CSV
pub fn parse_csv<R: Read>(input: R) -> SnapshotResult<ParamSet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许省略末尾列
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut set = ParamSet::new();
    for (idx, result) in reader.records().enumerate() {
        // 行号从 1 开始，表头占第 1 行
        let row_number = idx + 2;
        let record = result?;

        // value 参与元素等价判断，不做任何规整
        let row: HashMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(record.iter())
            .map(|(name, v)| if name == "value" { (name, v) } else { (name, v.trim()) })
            .collect();

        // 跳过完全空白的行
        if row.values().all(|v| v.trim().is_empty()) {
            continue;
        }

        set.insert(row_to_param(&row, row_number)?);
    }

    Ok(set)
}

fn row_to_param(row: &HashMap<&str, &str>, row_number: usize) -> SnapshotResult<Param> {
    let field = |name: &str| row.get(name).copied().unwrap_or("");

    let path = field("path");
    if path.is_empty() {
        return Err(SnapshotError::MissingField {
            row: row_number,
            field: "path".to_string(),
        });
    }
    if !row.contains_key("value") {
        return Err(SnapshotError::MissingField {
            row: row_number,
            field: "value".to_string(),
        });
    }

    let kind = match field("kind") {
        "" => ParamKind::String,
        marker => ParamKind::from_store_str(marker).ok_or_else(|| SnapshotError::InvalidKind {
            row: row_number,
            value: marker.to_string(),
        })?,
    };

    let version = match field("version") {
        "" => UNSAVED_VERSION,
        v => v,
    };

    Ok(Param::with_fields(path, field("value"), kind, version))
}

/// 把参数集合写入 CSV 文件（覆盖）
pub fn write_csv<P: AsRef<Path>>(set: &ParamSet, path: P) -> SnapshotResult<()> {
    let path = path.as_ref();
    render_csv(set, File::create(path)?)?;
    tracing::debug!(file = %path.display(), count = set.len(), "CSV 快照写入完成");
    Ok(())
}

/// 把参数集合渲染为 CSV
pub fn render_csv<W: Write>(set: &ParamSet, output: W) -> SnapshotResult<()> {
    let mut writer = WriterBuilder::new().from_writer(output);
    writer.write_record(CSV_HEADERS)?;
    for param in set {
        writer.write_record([
            param.path(),
            param.value(),
            param.kind().to_store_str(),
            param.version(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
