// ==========================================
// 参数集 - 参数存储 Trait
// ==========================================
// 职责: 定义参数存储接口（不包含集合代数）
// 实现者: MemoryParamStore, SqliteParamStore
// 红线: 列举中途失败时丢弃已取得的分页，不返回残缺结果
// 红线: 批量写入/删除不回滚，但收集全部单条失败
// ==========================================

use crate::domain::{Param, ParamSet};
use crate::repository::error::{BatchOperation, RecordFailure, StoreError, StoreResult};
use async_trait::async_trait;

/// 未解密读取 SecureString 时返回的占位值
pub const REDACTED_VALUE: &str = "********";

// ==========================================
// ParamStore Trait
// ==========================================
#[async_trait]
pub trait ParamStore: Send + Sync {
    /// 列举前缀下的全部参数（内部分页）
    ///
    /// # 参数
    /// - prefix: 路径前缀，必须以 `/` 开头
    /// - recursive: false 时只返回直接子节点
    ///
    /// # 返回
    /// - Ok(ParamSet): 按路径升序的参数集合
    /// - Err: 任一分页失败（已取得的分页全部丢弃）
    async fn fetch_by_path(&self, prefix: &str, recursive: bool) -> StoreResult<ParamSet>;

    /// 列举前缀下的全部参数，显式指定是否解密
    ///
    /// fetch_by_path 等价于以存储配置的解密开关调用本方法。
    /// 结果要再写回存储时（环境比对、迁移）必须以 decrypt=true 调用。
    async fn list_by_path(
        &self,
        prefix: &str,
        recursive: bool,
        decrypt: bool,
    ) -> StoreResult<ParamSet>;

    /// 读取单个参数
    ///
    /// # 返回
    /// - Ok(Param): 参数记录；decrypt=false 时 SecureString 值为 REDACTED_VALUE
    /// - Err(StoreError::NotFound): 路径不存在
    async fn fetch_one(&self, path: &str, decrypt: bool) -> StoreResult<Param>;

    /// 写入集合中的全部参数（存在则覆盖，版本号递增）
    ///
    /// 路径非法、或 SecureString 的值为 REDACTED_VALUE 的记录单条失败
    ///
    /// # 返回
    /// - Ok(usize): 写入条数
    /// - Err(StoreError::Batch): 每条失败的路径与原因；成功的记录不回滚
    async fn save(&self, params: &ParamSet) -> StoreResult<usize>;

    /// 删除集合中全部参数的路径（重复路径只删一次）
    ///
    /// # 返回
    /// - Ok(usize): 删除条数
    /// - Err(StoreError::Batch): 路径不存在或删除失败的记录
    async fn delete(&self, params: &ParamSet) -> StoreResult<usize>;
}

/// 校验参数路径: 以 `/` 开头，不以 `/` 结尾，不含空段
pub fn validate_path(path: &str) -> StoreResult<()> {
    let valid = path.len() > 1
        && path.starts_with('/')
        && !path.ends_with('/')
        && !path[1..].split('/').any(str::is_empty);
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidPath(path.to_string()))
    }
}

/// 校验待写入的记录: 路径合法，且不是脱敏后的密文占位值
pub fn validate_record(param: &Param) -> StoreResult<()> {
    validate_path(param.path())?;
    if param.kind().is_encrypted() && param.value() == REDACTED_VALUE {
        return Err(StoreError::RedactedValue(param.path().to_string()));
    }
    Ok(())
}

/// 校验列举前缀: 以 `/` 开头即可（`/` 表示根）
pub fn validate_prefix(prefix: &str) -> StoreResult<()> {
    if prefix.starts_with('/') {
        Ok(())
    } else {
        Err(StoreError::InvalidPath(prefix.to_string()))
    }
}

/// 按解密开关处理 SecureString 的值
pub fn apply_decryption(param: Param, decrypt: bool) -> Param {
    if decrypt || !param.kind().is_encrypted() {
        return param;
    }
    Param::with_fields(param.path(), REDACTED_VALUE, param.kind(), param.version())
}

/// 汇总批量操作结果
pub(crate) fn finish_batch(
    operation: BatchOperation,
    done: usize,
    failures: Vec<RecordFailure>,
) -> StoreResult<usize> {
    if failures.is_empty() {
        tracing::info!(%operation, count = done, "批量操作完成");
        return Ok(done);
    }

    for failure in &failures {
        tracing::warn!(%operation, path = %failure.path, cause = %failure.cause, "单条参数操作失败");
    }
    tracing::info!(%operation, succeeded = done, failed = failures.len(), "批量操作部分失败");

    Err(StoreError::Batch {
        operation,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParamKind;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("/cfg").is_ok());
        assert!(validate_path("/cfg/beta/beth").is_ok());

        for bad in ["", "/", "cfg/beta", "/cfg/", "/cfg//beta"] {
            assert!(
                matches!(validate_path(bad), Err(StoreError::InvalidPath(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_record_rejects_redacted_secret() {
        let redacted = Param::with_fields("/cfg/token", REDACTED_VALUE, ParamKind::SecureString, "1");
        assert!(matches!(
            validate_record(&redacted),
            Err(StoreError::RedactedValue(ref path)) if path == "/cfg/token"
        ));

        // 普通字符串恰好等于占位值时允许写入
        let plain = Param::new("/cfg/mask", REDACTED_VALUE);
        assert!(validate_record(&plain).is_ok());

        let bad_path = Param::with_fields("cfg/token", "s3cr3t", ParamKind::SecureString, "1");
        assert!(matches!(validate_record(&bad_path), Err(StoreError::InvalidPath(_))));
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("/").is_ok());
        assert!(validate_prefix("/cfg/").is_ok());
        assert!(validate_prefix("cfg").is_err());
    }

    #[test]
    fn test_apply_decryption() {
        let secret = Param::with_fields("/cfg/token", "s3cr3t", ParamKind::SecureString, "2");

        let shown = apply_decryption(secret.clone(), true);
        assert_eq!(shown.value(), "s3cr3t");

        let hidden = apply_decryption(secret, false);
        assert_eq!(hidden.value(), REDACTED_VALUE);
        assert_eq!(hidden.version(), "2");

        let plain = Param::new("/cfg/host", "db.local");
        assert_eq!(apply_decryption(plain.clone(), false), plain);
    }

    #[test]
    fn test_finish_batch() {
        assert_eq!(finish_batch(BatchOperation::Save, 3, Vec::new()).ok(), Some(3));

        let err = finish_batch(
            BatchOperation::Save,
            1,
            vec![RecordFailure {
                path: "bad".to_string(),
                cause: "无效的参数路径".to_string(),
            }],
        )
        .expect_err("failures must surface");
        assert_eq!(err.failed_paths(), vec!["bad"]);
    }
}
