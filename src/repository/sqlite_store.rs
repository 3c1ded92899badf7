// ==========================================
// 参数集 - SQLite 参数存储
// ==========================================
// 职责: ParamStore 的本地持久化实现（远端参数存储的替身）
// 存储: parameter 表 (path 主键 + value + kind 类型标记 + version)
// 约束: 所有查询使用参数化；列举使用键集分页（按 path 游标）
// ==========================================

use crate::config::StoreConfig;
use crate::db::{
    configure_sqlite_connection, init_schema, open_sqlite_connection, read_schema_version,
    CURRENT_SCHEMA_VERSION,
};
use crate::domain::{path_matches_prefix, Param, ParamKind, ParamSet};
use crate::repository::error::{BatchOperation, RecordFailure, StoreError, StoreResult};
use crate::repository::param_store::{
    apply_decryption, finish_batch, validate_path, validate_prefix, validate_record, ParamStore,
};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

// 一行原始记录: (path, value, kind 标记, version)
type RawRow = (String, String, String, i64);

// ==========================================
// SqliteParamStore - SQLite 参数存储
// ==========================================
pub struct SqliteParamStore {
    conn: Arc<Mutex<Connection>>,
    page_size: usize,
    with_decryption: bool,
}

impl SqliteParamStore {
    /// 按配置打开存储
    ///
    /// # 返回
    /// - Ok(Self): 已建表、可直接使用的存储
    /// - Err: 配置非法或数据库无法打开（不会返回半初始化的句柄）
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;

        let conn = open_sqlite_connection(&config.db_path).map_err(|e| {
            StoreError::DatabaseConnectionError(format!("{}: {}", config.db_path, e))
        })?;
        init_schema(&conn)?;
        check_schema_version(&conn)?;

        tracing::info!(db_path = %config.db_path, page_size = config.page_size, "参数存储已打开");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            page_size: config.page_size,
            with_decryption: config.with_decryption,
        })
    }

    /// 从已有连接创建存储
    ///
    /// 会对传入连接再次应用统一 PRAGMA 并建表（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>, config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        {
            let guard = conn
                .lock()
                .map_err(|e| StoreError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
            check_schema_version(&guard)?;
        }

        Ok(Self {
            conn,
            page_size: config.page_size,
            with_decryption: config.with_decryption,
        })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))
    }

    /// 读取一页: path 以 `base/` 开头且大于游标，按 path 升序
    fn fetch_page(&self, base: &str, after: Option<&str>) -> StoreResult<Vec<RawRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT path, value, kind, version
            FROM parameter
            WHERE substr(path, 1, length(?1)) = ?1
              AND path > ?2
            ORDER BY path ASC
            LIMIT ?3
            "#,
        )?;

        let rows = stmt
            .query_map(
                params![format!("{}/", base), after.unwrap_or(""), self.page_size as i64],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?
            .collect::<rusqlite::Result<Vec<RawRow>>>()?;

        Ok(rows)
    }

    fn row_to_param(row: RawRow) -> StoreResult<Param> {
        let (path, value, marker, version) = row;
        let kind = ParamKind::from_store_str(&marker).ok_or_else(|| StoreError::UnknownKind {
            path: path.clone(),
            marker,
        })?;
        Ok(Param::with_fields(path, value, kind, version.to_string()))
    }

    fn upsert(conn: &Connection, param: &Param) -> StoreResult<()> {
        validate_record(param)?;
        conn.execute(
            r#"
            INSERT INTO parameter (path, value, kind, version, updated_at)
            VALUES (?1, ?2, ?3, 1, ?4)
            ON CONFLICT(path) DO UPDATE SET
                value = excluded.value,
                kind = excluded.kind,
                version = parameter.version + 1,
                updated_at = excluded.updated_at
            "#,
            params![
                param.path(),
                param.value(),
                param.kind().to_store_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

// 数据库由更新版本的程序创建时拒绝打开
fn check_schema_version(conn: &Connection) -> StoreResult<()> {
    match read_schema_version(conn)? {
        Some(found) if found > CURRENT_SCHEMA_VERSION => Err(StoreError::DatabaseConnectionError(
            format!(
                "schema_version={} 高于当前支持的 {}",
                found, CURRENT_SCHEMA_VERSION
            ),
        )),
        _ => Ok(()),
    }
}

#[async_trait]
impl ParamStore for SqliteParamStore {
    async fn fetch_by_path(&self, prefix: &str, recursive: bool) -> StoreResult<ParamSet> {
        self.list_by_path(prefix, recursive, self.with_decryption).await
    }

    async fn list_by_path(
        &self,
        prefix: &str,
        recursive: bool,
        decrypt: bool,
    ) -> StoreResult<ParamSet> {
        validate_prefix(prefix)?;
        let base = prefix.trim_end_matches('/');

        let mut collected = ParamSet::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            // 任一分页失败: 丢弃已收集的结果
            let rows = self
                .fetch_page(base, cursor.as_deref())
                .map_err(|e| StoreError::Retrieval {
                    path: prefix.to_string(),
                    cause: e.to_string(),
                })?;
            pages += 1;

            let page_len = rows.len();
            cursor = rows.last().map(|row| row.0.clone());

            for row in rows {
                let param = Self::row_to_param(row)?;
                if path_matches_prefix(param.path(), prefix, recursive) {
                    collected.insert(apply_decryption(param, decrypt));
                }
            }

            if page_len < self.page_size {
                break;
            }
        }

        tracing::debug!(prefix, recursive, pages, count = collected.len(), "参数列举完成");
        Ok(collected)
    }

    async fn fetch_one(&self, path: &str, decrypt: bool) -> StoreResult<Param> {
        validate_path(path)?;
        let conn = self.get_conn()?;

        let row: Option<RawRow> = conn
            .query_row(
                "SELECT path, value, kind, version FROM parameter WHERE path = ?1",
                params![path],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(|e| StoreError::Retrieval {
                path: path.to_string(),
                cause: e.to_string(),
            })?;

        match row {
            Some(row) => Ok(apply_decryption(Self::row_to_param(row)?, decrypt)),
            None => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    async fn save(&self, set: &ParamSet) -> StoreResult<usize> {
        let conn = self.get_conn()?;
        let mut failures = Vec::new();
        let mut written = 0;

        for param in set {
            match Self::upsert(&conn, param) {
                Ok(()) => written += 1,
                Err(e) => failures.push(RecordFailure {
                    path: param.path().to_string(),
                    cause: e.to_string(),
                }),
            }
        }

        drop(conn);
        finish_batch(BatchOperation::Save, written, failures)
    }

    async fn delete(&self, set: &ParamSet) -> StoreResult<usize> {
        let conn = self.get_conn()?;
        let mut failures = Vec::new();
        let mut deleted = 0;

        for path in set.paths() {
            match conn.execute("DELETE FROM parameter WHERE path = ?1", params![path]) {
                Ok(0) => failures.push(RecordFailure {
                    path: path.to_string(),
                    cause: StoreError::NotFound {
                        path: path.to_string(),
                    }
                    .to_string(),
                }),
                Ok(_) => deleted += 1,
                Err(e) => failures.push(RecordFailure {
                    path: path.to_string(),
                    cause: StoreError::from(e).to_string(),
                }),
            }
        }

        drop(conn);
        finish_batch(BatchOperation::Delete, deleted, failures)
    }
}
