// ==========================================
// 参数集 - 内存参数存储
// ==========================================
// 职责: ParamStore 的进程内实现，用于测试与离线演练
// 存储: BTreeMap<path, 记录>，列举结果天然按路径有序
// ==========================================

use crate::domain::{path_matches_prefix, Param, ParamKind, ParamSet};
use crate::repository::error::{BatchOperation, RecordFailure, StoreError, StoreResult};
use crate::repository::param_store::{
    apply_decryption, finish_batch, validate_path, validate_prefix, validate_record, ParamStore,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct StoredParam {
    value: String,
    kind: ParamKind,
    version: u64,
}

// ==========================================
// MemoryParamStore - 内存参数存储
// ==========================================
#[derive(Debug, Clone)]
pub struct MemoryParamStore {
    params: Arc<Mutex<BTreeMap<String, StoredParam>>>,
    with_decryption: bool,
}

impl Default for MemoryParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryParamStore {
    /// 创建空存储（列举时解密）
    pub fn new() -> Self {
        Self {
            params: Arc::new(Mutex::new(BTreeMap::new())),
            with_decryption: true,
        }
    }

    /// 设置列举时是否解密
    pub fn with_decryption(mut self, with_decryption: bool) -> Self {
        self.with_decryption = with_decryption;
        self
    }

    /// 当前存储的参数条数
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, BTreeMap<String, StoredParam>>> {
        self.params
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))
    }

    fn to_param(path: &str, stored: &StoredParam) -> Param {
        Param::with_fields(
            path,
            stored.value.clone(),
            stored.kind,
            stored.version.to_string(),
        )
    }
}

#[async_trait]
impl ParamStore for MemoryParamStore {
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
        let params = self.lock()?;

        let set: ParamSet = params
            .iter()
            .filter(|(path, _)| path_matches_prefix(path, prefix, recursive))
            .map(|(path, stored)| apply_decryption(Self::to_param(path, stored), decrypt))
            .collect();

        tracing::debug!(prefix, recursive, count = set.len(), "内存存储列举完成");
        Ok(set)
    }

    async fn fetch_one(&self, path: &str, decrypt: bool) -> StoreResult<Param> {
        validate_path(path)?;
        let params = self.lock()?;

        params
            .get(path)
            .map(|stored| apply_decryption(Self::to_param(path, stored), decrypt))
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })
    }

    async fn save(&self, set: &ParamSet) -> StoreResult<usize> {
        let mut params = self.lock()?;
        let mut failures = Vec::new();
        let mut written = 0;

        for param in set {
            if let Err(e) = validate_record(param) {
                failures.push(RecordFailure {
                    path: param.path().to_string(),
                    cause: e.to_string(),
                });
                continue;
            }

            let version = params.get(param.path()).map_or(1, |s| s.version + 1);
            params.insert(
                param.path().to_string(),
                StoredParam {
                    value: param.value().to_string(),
                    kind: param.kind(),
                    version,
                },
            );
            written += 1;
        }

        drop(params);
        finish_batch(BatchOperation::Save, written, failures)
    }

    async fn delete(&self, set: &ParamSet) -> StoreResult<usize> {
        let mut params = self.lock()?;
        let mut failures = Vec::new();
        let mut deleted = 0;

        for path in set.paths() {
            if params.remove(path).is_some() {
                deleted += 1;
            } else {
                failures.push(RecordFailure {
                    path: path.to_string(),
                    cause: StoreError::NotFound {
                        path: path.to_string(),
                    }
                    .to_string(),
                });
            }
        }

        drop(params);
        finish_batch(BatchOperation::Delete, deleted, failures)
    }
}
