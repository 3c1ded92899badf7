// ==========================================
// 参数集 - 快照层
// ==========================================
// 职责: 参数集合与本地文件（CSV / JSON）互转，用于离线比对与备份
// ==========================================

pub mod csv_snapshot;
pub mod error;
pub mod json_snapshot;

// 重导出
pub use csv_snapshot::{parse_csv, read_csv, render_csv, write_csv, CSV_HEADERS};
pub use error::{SnapshotError, SnapshotResult};
pub use json_snapshot::{from_json, read_json, to_json, write_json};
