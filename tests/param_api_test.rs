// ==========================================
// ParamApi 集成测试
// ==========================================
// 测试目标: 验证读取/写入/比对/迁移工作流
// ==========================================


use paramset::repository::ParamStore;
use paramset::{ApiError, MemoryParamStore, Param, ParamApi, ParamKind, ParamSet};
use std::sync::Arc;
use test_helpers::{create_test_store, environments, left, FlakyStore};

async fn seeded_memory_store() -> MemoryParamStore {
    let store = MemoryParamStore::new();
    store.save(&environments()).await.expect("Failed to seed store");
    store
}

#[tokio::test]
async fn test_read_adds_single_param() {
    let store = seeded_memory_store().await;
    let api = ParamApi::new(Arc::new(store));

    let base = ParamSet::from_params(vec![Param::new("/local/only", "x")]);
    let result = api
        .read(&base, "/dev/app/db/host", true)
        .await
        .expect("Failed to read");

    assert_eq!(result.len(), 2);
    assert_eq!(base.len(), 1, "input set is untouched");
    assert_eq!(result.get("/dev/app/db/host").map(Param::version), Some("1"));

    let err = api.read(&base, "/dev/app/missing", true).await.expect_err("missing");
    assert!(matches!(err, ApiError::NotFound(ref path) if path == "/dev/app/missing"));
}

#[tokio::test]
async fn test_reads_merges_prefix_listing() {
    let api = ParamApi::new(Arc::new(seeded_memory_store().await));

    let base = ParamSet::from_params(vec![Param::new("/dev/app/db/host", "dev-db.local")]);
    let result = api.reads(&base, "/dev/app").await.expect("Failed to reads");

    assert_eq!(result.len(), 3, "existing element is not duplicated");
    assert_eq!(
        result.get("/dev/app/db/host").map(Param::version),
        Some("0"),
        "receiver copy wins on collision"
    );

    let err = api.reads(&base, "  ").await.expect_err("blank prefix");
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn test_write_and_remove_round_trip() {
    let (_temp_file, store) = create_test_store(2);
    let store = Arc::new(store);
    let api = ParamApi::new(store.clone());

    assert_eq!(api.write(&left()).await.expect("write"), 3);
    assert!(store.fetch_by_path("/cfg", true).await.expect("fetch").equals(&left()));

    assert_eq!(api.remove(&left()).await.expect("remove"), 3);
    assert!(store.fetch_by_path("/cfg", true).await.expect("fetch").is_empty());

    let err = api.remove(&left()).await.expect_err("already removed");
    match err {
        ApiError::BatchFailed { failures, .. } => assert_eq!(failures.len(), 3),
        other => panic!("expected batch failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_many_merges_and_fails_atomically() {
    let store = seeded_memory_store().await;
    let api = ParamApi::new(Arc::new(store.clone()));

    let merged = api
        .fetch_many(&["/dev/app/db", "/prod/app"])
        .await
        .expect("Failed to fetch many");
    assert_eq!(merged.len(), 5);

    let flaky = FlakyStore::new(store).fail_listing("/prod/app");
    let api = ParamApi::new(Arc::new(flaky));
    let err = api
        .fetch_many(&["/dev/app", "/prod/app"])
        .await
        .expect_err("one prefix fails");
    match err {
        ApiError::RetrievalFailed(msg) => assert!(msg.contains("/prod/app")),
        other => panic!("expected retrieval failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_diff_environments() {
    let api = ParamApi::new(Arc::new(seeded_memory_store().await));

    let diff = api.diff("/dev/app", "/prod/app").await.expect("Failed to diff");

    assert_eq!(
        diff.only_left.paths(),
        vec!["/dev/app/db/host", "/dev/app/feature/beta"]
    );
    assert_eq!(diff.only_right.paths(), vec!["/dev/app/db/host", "/dev/app/legacy"]);
    assert_eq!(diff.changed_paths, vec!["/dev/app/db/host".to_string()]);
    assert!(!diff.is_empty());

    let same = api.diff("/dev/app", "/dev/app/").await.expect("Failed to diff");
    assert!(same.is_empty());
}

#[tokio::test]
async fn test_promotion_plan_and_apply() {
    let store = Arc::new(seeded_memory_store().await);
    let api = ParamApi::new(store.clone());

    let plan = api
        .plan_promotion("/dev/app", "/prod/app")
        .await
        .expect("Failed to plan");

    assert_eq!(
        plan.to_write.paths(),
        vec!["/prod/app/db/host", "/prod/app/feature/beta"]
    );
    assert_eq!(plan.to_delete.paths(), vec!["/prod/app/legacy"]);
    assert_eq!(
        plan.to_write.get("/prod/app/db/host").map(Param::value),
        Some("dev-db.local")
    );

    let outcome = api.apply_promotion(&plan).await.expect("Failed to apply");
    assert_eq!(outcome.deleted, 1);
    assert_eq!(outcome.written, 2);

    let dev = store.fetch_by_path("/dev/app", true).await.expect("fetch dev");
    let prod = store.fetch_by_path("/prod/app", true).await.expect("fetch prod");
    assert!(prod.rebase("/prod/app", "/dev/app").equals(&dev));
    assert_eq!(
        prod.get("/prod/app/db/password").map(Param::kind),
        Some(ParamKind::SecureString)
    );

    let again = api
        .plan_promotion("/dev/app", "/prod/app")
        .await
        .expect("Failed to plan");
    assert!(again.is_empty(), "promotion converges");
}

#[tokio::test]
async fn test_apply_promotion_reports_partial_failure() {
    let store = seeded_memory_store().await;
    let flaky = FlakyStore::new(store.clone()).fail_write("/prod/app/feature/beta");
    let api = ParamApi::new(Arc::new(flaky));

    let plan = api
        .plan_promotion("/dev/app", "/prod/app")
        .await
        .expect("Failed to plan");
    let err = api.apply_promotion(&plan).await.expect_err("one write fails");

    match err {
        ApiError::PromotionFailed {
            deleted,
            written,
            errors,
        } => {
            assert_eq!(deleted, 1);
            assert_eq!(written, 1);
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("/prod/app/feature/beta"));
        }
        other => panic!("expected promotion failure, got {:?}", other),
    }

    // 不回滚: 成功的写入与删除已生效
    let prod = store.fetch_by_path("/prod/app", true).await.expect("fetch prod");
    assert_eq!(prod.paths(), vec!["/prod/app/db/host", "/prod/app/db/password"]);
}

#[tokio::test]
async fn test_promotion_uses_real_secret_values_when_store_redacts() {
    let store = MemoryParamStore::new().with_decryption(false);
    store
        .save(&ParamSet::from_params(vec![
            Param::with_fields("/dev/app/pw", "real-secret", ParamKind::SecureString, "0"),
            Param::with_fields("/prod/app/pw", "old-secret", ParamKind::SecureString, "0"),
        ]))
        .await
        .expect("Failed to seed store");
    let store = Arc::new(store);
    let api = ParamApi::new(store.clone());

    let diff = api.diff("/dev/app", "/prod/app").await.expect("Failed to diff");
    assert_eq!(diff.changed_paths, vec!["/dev/app/pw".to_string()]);

    let plan = api
        .plan_promotion("/dev/app", "/prod/app")
        .await
        .expect("Failed to plan");
    assert_eq!(
        plan.to_write.get("/prod/app/pw").map(Param::value),
        Some("real-secret")
    );

    api.apply_promotion(&plan).await.expect("Failed to apply");
    let promoted = store.fetch_one("/prod/app/pw", true).await.expect("fetch");
    assert_eq!(promoted.value(), "real-secret");

    // 存储配置仍然生效: 普通列举返回占位值
    let listed = store.fetch_by_path("/prod/app", true).await.expect("fetch");
    assert_eq!(
        listed.get("/prod/app/pw").map(Param::value),
        Some(paramset::repository::REDACTED_VALUE)
    );
}

#[tokio::test]
async fn test_write_rejects_redacted_listing() {
    let store = MemoryParamStore::new().with_decryption(false);
    store.save(&environments()).await.expect("Failed to seed store");
    let api = ParamApi::new(Arc::new(store.clone()));

    let listed = store.fetch_by_path("/dev/app", true).await.expect("fetch");
    let err = api.write(&listed).await.expect_err("redacted secret");
    match err {
        ApiError::BatchFailed { failures, .. } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].path, "/dev/app/db/password");
        }
        other => panic!("expected batch failure, got {:?}", other),
    }

    let secret = store
        .fetch_one("/dev/app/db/password", true)
        .await
        .expect("fetch");
    assert_eq!(secret.value(), "dev-pw");
}
