// ==========================================
// 参数集 - 参数工作流 API
// ==========================================
// 职责: 组合参数存储与集合代数
// 1. 读取: read / reads / fetch_many
// 2. 写入: write / remove
// 3. 环境比对: diff
// 4. 环境迁移: plan_promotion / apply_promotion
// 红线: 集合运算只在内存中进行，结果交还存储层落库
// ==========================================

use std::sync::Arc;

use futures::future::join_all;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::ParamSet;
use crate::repository::{ParamStore, StoreError};

// ==========================================
// EnvDiff - 两个环境的差异
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct EnvDiff {
    pub only_left: ParamSet,          // 左侧独有（路径按左侧前缀）
    pub only_right: ParamSet,         // 右侧独有（已改挂到左侧前缀）
    pub changed_paths: Vec<String>,   // 两侧都有但值不同的路径
}

impl EnvDiff {
    /// 两个环境内容一致
    pub fn is_empty(&self) -> bool {
        self.only_left.is_empty() && self.only_right.is_empty()
    }
}

// ==========================================
// PromotionPlan - 环境迁移计划
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct PromotionPlan {
    pub to_write: ParamSet,   // 目标环境需要写入/覆盖的记录
    pub to_delete: ParamSet,  // 目标环境中源环境已不存在的记录
}

impl PromotionPlan {
    pub fn is_empty(&self) -> bool {
        self.to_write.is_empty() && self.to_delete.is_empty()
    }
}

/// 迁移执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PromotionOutcome {
    pub deleted: usize,
    pub written: usize,
}

// ==========================================
// ParamApi - 参数工作流 API
// ==========================================
pub struct ParamApi {
    store: Arc<dyn ParamStore>,
}

impl ParamApi {
    /// 创建新的ParamApi实例
    pub fn new(store: Arc<dyn ParamStore>) -> Self {
        Self { store }
    }

    /// 返回 set 与 path 处参数的并集
    pub async fn read(&self, set: &ParamSet, path: &str, decrypt: bool) -> ApiResult<ParamSet> {
        let param = self.store.fetch_one(path, decrypt).await?;
        Ok(set.union(&ParamSet::from_params(vec![param])))
    }

    /// 返回 set 与前缀下全部参数（递归）的并集
    pub async fn reads(&self, set: &ParamSet, prefix: &str) -> ApiResult<ParamSet> {
        let fetched = self.fetch(prefix).await?;
        Ok(set.union(&fetched))
    }

    /// 写入集合中的全部参数
    pub async fn write(&self, set: &ParamSet) -> ApiResult<usize> {
        Ok(self.store.save(set).await?)
    }

    /// 删除集合中全部参数的路径
    pub async fn remove(&self, set: &ParamSet) -> ApiResult<usize> {
        Ok(self.store.delete(set).await?)
    }

    /// 并发列举多个前缀，按输入顺序合并为一个集合
    ///
    /// 任一前缀失败则整体失败
    pub async fn fetch_many(&self, prefixes: &[&str]) -> ApiResult<ParamSet> {
        for prefix in prefixes {
            check_prefix(prefix)?;
        }

        let results = join_all(
            prefixes
                .iter()
                .map(|prefix| self.store.fetch_by_path(prefix, true)),
        )
        .await;

        // 各分片在当前任务上合并，之后才做集合运算
        let mut merged = ParamSet::new();
        for result in results {
            merged = merged.union(&result?);
        }

        tracing::debug!(prefixes = prefixes.len(), count = merged.len(), "多前缀列举完成");
        Ok(merged)
    }

    /// 比较两个环境（右侧路径改挂到左侧前缀后比较）
    pub async fn diff(&self, left_prefix: &str, right_prefix: &str) -> ApiResult<EnvDiff> {
        let left = self.fetch_decrypted(left_prefix).await?;
        let right = self
            .fetch_decrypted(right_prefix)
            .await?
            .rebase(right_prefix, left_prefix);

        let only_left = left.difference(&right);
        let only_right = right.difference(&left);

        let right_paths = only_right.paths();
        let changed_paths: Vec<String> = only_left
            .paths()
            .into_iter()
            .filter(|path| right_paths.contains(path))
            .map(str::to_string)
            .collect();

        tracing::info!(
            left = left_prefix,
            right = right_prefix,
            only_left = only_left.len(),
            only_right = only_right.len(),
            changed = changed_paths.len(),
            "环境比对完成"
        );

        Ok(EnvDiff {
            only_left,
            only_right,
            changed_paths,
        })
    }

    /// 生成把 target 环境同步为 source 环境的迁移计划
    pub async fn plan_promotion(
        &self,
        source_prefix: &str,
        target_prefix: &str,
    ) -> ApiResult<PromotionPlan> {
        let desired = self
            .fetch_decrypted(source_prefix)
            .await?
            .rebase(source_prefix, target_prefix);
        let current = self.fetch_decrypted(target_prefix).await?;

        let to_write = desired.difference(&current);

        let desired_paths = desired.paths();
        let to_delete: ParamSet = current
            .iter()
            .filter(|p| !desired_paths.contains(&p.path()))
            .cloned()
            .collect();

        tracing::info!(
            source = source_prefix,
            target = target_prefix,
            to_write = to_write.len(),
            to_delete = to_delete.len(),
            "迁移计划已生成"
        );

        Ok(PromotionPlan {
            to_write,
            to_delete,
        })
    }

    /// 执行迁移计划: 先删除再写入，两步的失败一并报告
    pub async fn apply_promotion(&self, plan: &PromotionPlan) -> ApiResult<PromotionOutcome> {
        let deleted = if plan.to_delete.is_empty() {
            Ok(0)
        } else {
            self.store.delete(&plan.to_delete).await
        };

        let written = if plan.to_write.is_empty() {
            Ok(0)
        } else {
            self.store.save(&plan.to_write).await
        };

        match (deleted, written) {
            (Ok(deleted), Ok(written)) => Ok(PromotionOutcome { deleted, written }),
            (deleted, written) => {
                let mut errors = Vec::new();
                let deleted_count = match deleted {
                    Ok(n) => n,
                    Err(e) => {
                        errors.push(e.to_string());
                        succeeded(plan.to_delete.paths().len(), &e)
                    }
                };
                let written_count = match written {
                    Ok(n) => n,
                    Err(e) => {
                        errors.push(e.to_string());
                        succeeded(plan.to_write.len(), &e)
                    }
                };

                Err(ApiError::PromotionFailed {
                    deleted: deleted_count,
                    written: written_count,
                    errors,
                })
            }
        }
    }

    async fn fetch(&self, prefix: &str) -> ApiResult<ParamSet> {
        check_prefix(prefix)?;
        Ok(self.store.fetch_by_path(prefix, true).await?)
    }

    // 比对与迁移按真实值进行，不受存储的解密配置影响
    async fn fetch_decrypted(&self, prefix: &str) -> ApiResult<ParamSet> {
        check_prefix(prefix)?;
        Ok(self.store.list_by_path(prefix, true, true).await?)
    }
}

// 批量失败时成功的条数；非批量错误视为整步未执行
fn succeeded(total: usize, err: &StoreError) -> usize {
    match err {
        StoreError::Batch { failures, .. } => total.saturating_sub(failures.len()),
        _ => 0,
    }
}

fn check_prefix(prefix: &str) -> ApiResult<()> {
    if prefix.trim().is_empty() {
        return Err(ApiError::InvalidInput("路径前缀不能为空".to_string()));
    }
    Ok(())
}
