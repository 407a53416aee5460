//! Integration tests for the SQLite execution store.

mod common;

use serde_json::json;
use uuid::Uuid;

use common::setup_test_db;
use flywheel::adapters::sqlite::SqliteExecutionStore;
use flywheel::domain::ports::ExecutionStore;
use flywheel::{ExecutionRecord, TriggerJob, TriggerType};

fn job(rule_id: Uuid) -> TriggerJob {
    TriggerJob::new(
        rule_id,
        TriggerType::TaskStatusChanged,
        json!({"task": {"id": Uuid::new_v4(), "status": "done"}}),
    )
    .with_triggered_by(Uuid::new_v4())
}

#[tokio::test]
async fn test_record_round_trip() {
    let pool = setup_test_db().await;
    let store = SqliteExecutionStore::new(pool);
    let rule_id = Uuid::new_v4();
    let job = job(rule_id);

    let record = ExecutionRecord::completed(&job, json!({"taskId": "t1", "status": "done"}), 42);
    store.create(&record).await.unwrap();

    let loaded = store.list_for_rule(rule_id, 10).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, record.id);
    assert!(loaded[0].success);
    assert!(!loaded[0].skipped);
    assert_eq!(loaded[0].execution_time_ms, 42);
    assert_eq!(loaded[0].action_result, record.action_result);
    assert_eq!(loaded[0].triggered_by, job.triggered_by);
    assert_eq!(loaded[0].trigger_payload, job.trigger_data);
}

#[tokio::test]
async fn test_failure_and_skip_records() {
    let pool = setup_test_db().await;
    let store = SqliteExecutionStore::new(pool);
    let rule_id = Uuid::new_v4();
    let job = job(rule_id);

    store
        .create(&ExecutionRecord::failed(&job, "entity not found", 7))
        .await
        .unwrap();
    store.create(&ExecutionRecord::skipped(&job, 1)).await.unwrap();

    let loaded = store.list_for_rule(rule_id, 10).await.unwrap();
    assert_eq!(loaded.len(), 2);

    let failure = loaded.iter().find(|r| !r.success).unwrap();
    assert_eq!(failure.error_message.as_deref(), Some("entity not found"));
    assert!(failure.action_result.is_none());

    let skip = loaded.iter().find(|r| r.skipped).unwrap();
    assert!(skip.success);
    assert!(skip.action_result.is_none());
}

#[tokio::test]
async fn test_list_is_newest_first_and_limited() {
    let pool = setup_test_db().await;
    let store = SqliteExecutionStore::new(pool);
    let rule_id = Uuid::new_v4();

    for i in 0..5 {
        let mut record = ExecutionRecord::skipped(&job(rule_id), i);
        // Space the timestamps out so ordering is deterministic.
        record.created_at = record.created_at + chrono::Duration::seconds(i);
        store.create(&record).await.unwrap();
    }

    let loaded = store.list_for_rule(rule_id, 3).await.unwrap();
    assert_eq!(loaded.len(), 3);
    assert!(loaded.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    assert_eq!(loaded[0].execution_time_ms, 4);
}

#[tokio::test]
async fn test_records_are_scoped_per_rule() {
    let pool = setup_test_db().await;
    let store = SqliteExecutionStore::new(pool);
    let rule_a = Uuid::new_v4();
    let rule_b = Uuid::new_v4();

    store.create(&ExecutionRecord::skipped(&job(rule_a), 1)).await.unwrap();
    store.create(&ExecutionRecord::skipped(&job(rule_b), 1)).await.unwrap();

    assert_eq!(store.list_for_rule(rule_a, 10).await.unwrap().len(), 1);
    assert_eq!(store.list_for_rule(rule_b, 10).await.unwrap().len(), 1);
}
