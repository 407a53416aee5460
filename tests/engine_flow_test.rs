//! End-to-end engine flow over real SQLite stores: trigger job in, audit
//! record out.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use uuid::Uuid;

use common::{seed_project, setup_test_db};
use flywheel::adapters::sqlite::{
    SqliteCommentStore, SqliteExecutionStore, SqliteNotificationStore, SqliteRuleStore,
    SqliteTaskStore,
};
use flywheel::domain::ports::{ExecutionStore, RuleStore, TaskStore};
use flywheel::{
    ActionKind, ActionRegistry, EngineError, NullNotifier, Rule, RuleOrchestrator, RuleStatus,
    Task, TriggerJob, TriggerType,
};

struct Harness {
    pool: sqlx::SqlitePool,
    rules: Arc<SqliteRuleStore>,
    tasks: Arc<SqliteTaskStore>,
    executions: Arc<SqliteExecutionStore>,
    orchestrator: RuleOrchestrator,
}

async fn harness(record_unmatched: bool) -> Harness {
    let pool = setup_test_db().await;
    let rules = Arc::new(SqliteRuleStore::new(pool.clone()));
    let tasks = Arc::new(SqliteTaskStore::new(pool.clone()));
    let executions = Arc::new(SqliteExecutionStore::new(pool.clone()));

    let registry = ActionRegistry::with_default_handlers(
        tasks.clone(),
        Arc::new(SqliteNotificationStore::new(pool.clone())),
        Arc::new(SqliteCommentStore::new(pool.clone())),
        Arc::new(NullNotifier),
    );
    let orchestrator =
        RuleOrchestrator::new(rules.clone(), Arc::new(registry), executions.clone())
            .with_record_unmatched(record_unmatched);

    Harness { pool, rules, tasks, executions, orchestrator }
}

fn change_status_rule() -> Rule {
    Rule::new(
        Uuid::new_v4(),
        "escalate-high-priority",
        TriggerType::TaskCreated,
        ActionKind::ChangeStatus,
        json!({"status": "in_review"}),
        Uuid::new_v4(),
    )
    .with_conditions(json!({
        "op": "and",
        "conditions": [
            {"op": "equals", "field": "task.priority", "value": "HIGH"}
        ]
    }))
}

#[tokio::test]
async fn test_matching_trigger_mutates_task_and_audits_success() {
    let hx = harness(false).await;
    let project = seed_project(&hx.pool, "core").await;
    let task = Task::new(project, 1, "CORE-1", "Fix login");
    hx.tasks.create(&task).await.unwrap();

    let rule = change_status_rule();
    hx.rules.insert(&rule).await.unwrap();

    let job = TriggerJob::new(
        rule.id,
        TriggerType::TaskCreated,
        json!({"task": {"id": task.id, "priority": "HIGH"}}),
    );
    let outcome = hx.orchestrator.execute(&job).await.unwrap();

    assert!(outcome.success && !outcome.skipped);
    assert_eq!(hx.tasks.get(task.id).await.unwrap().unwrap().status, "in_review");

    let records = hx.executions.list_for_rule(rule.id, 10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].success);
    let snapshot = records[0].action_result.as_ref().unwrap();
    assert_eq!(snapshot["status"], json!("in_review"));
}

#[tokio::test]
async fn test_unmatched_trigger_skips_without_touching_the_task() {
    let hx = harness(false).await;
    let project = seed_project(&hx.pool, "core").await;
    let task = Task::new(project, 1, "CORE-1", "Fix login");
    hx.tasks.create(&task).await.unwrap();

    let rule = change_status_rule();
    hx.rules.insert(&rule).await.unwrap();

    let job = TriggerJob::new(
        rule.id,
        TriggerType::TaskCreated,
        json!({"task": {"id": task.id, "priority": "LOW"}}),
    );
    let outcome = hx.orchestrator.execute(&job).await.unwrap();

    assert!(outcome.skipped);
    assert_eq!(hx.tasks.get(task.id).await.unwrap().unwrap().status, "todo");

    let records = hx.executions.list_for_rule(rule.id, 10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].skipped);
    assert!(records[0].action_result.is_none());
}

#[tokio::test]
async fn test_missing_entity_records_failure_and_reraises() {
    let hx = harness(false).await;
    let rule = change_status_rule();
    hx.rules.insert(&rule).await.unwrap();

    // Payload points at a task that does not exist.
    let job = TriggerJob::new(
        rule.id,
        TriggerType::TaskCreated,
        json!({"task": {"id": Uuid::new_v4(), "priority": "HIGH"}}),
    );
    let err = hx.orchestrator.execute(&job).await.unwrap_err();

    assert!(matches!(err, EngineError::Action { .. }));
    assert!(err.to_string().contains("not found"));

    let records = hx.executions.list_for_rule(rule.id, 10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].success);
    assert!(records[0].error_message.as_deref().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_inactive_rule_is_silent_unless_configured() {
    let hx = harness(false).await;
    let rule = change_status_rule().with_status(RuleStatus::Inactive);
    hx.rules.insert(&rule).await.unwrap();
    let job = TriggerJob::new(rule.id, TriggerType::TaskCreated, json!({}));

    let outcome = hx.orchestrator.execute(&job).await.unwrap();
    assert!(outcome.skipped);
    assert!(hx.executions.list_for_rule(rule.id, 10).await.unwrap().is_empty());

    // Same setup with unmatched recording on.
    let hx = harness(true).await;
    let rule = change_status_rule().with_status(RuleStatus::Inactive);
    hx.rules.insert(&rule).await.unwrap();
    let job = TriggerJob::new(rule.id, TriggerType::TaskCreated, json!({}));

    hx.orchestrator.execute(&job).await.unwrap();
    let records = hx.executions.list_for_rule(rule.id, 10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].skipped);
}

#[tokio::test]
async fn test_create_task_rule_assigns_sequences_and_slugs() {
    let hx = harness(false).await;
    let source_project = seed_project(&hx.pool, "intake").await;
    let target_project = seed_project(&hx.pool, "ops").await;
    let task = Task::new(source_project, 1, "INTAKE-1", "Incident report");
    hx.tasks.create(&task).await.unwrap();

    let rule = Rule::new(
        Uuid::new_v4(),
        "spawn-followup",
        TriggerType::TaskCompleted,
        ActionKind::CreateTask,
        json!({"projectId": target_project, "title": "Post-incident review", "priority": "high"}),
        Uuid::new_v4(),
    );
    hx.rules.insert(&rule).await.unwrap();

    let job = TriggerJob::new(
        rule.id,
        TriggerType::TaskCompleted,
        json!({"task": {"id": task.id}}),
    );
    let first = hx.orchestrator.execute(&job).await.unwrap();
    let second = hx.orchestrator.execute(&job).await.unwrap();

    let first_result = first.result.unwrap();
    let second_result = second.result.unwrap();
    assert_eq!(first_result["slug"], json!("OPS-1"));
    assert_eq!(second_result["slug"], json!("OPS-2"));
    assert_eq!(hx.tasks.next_sequence(target_project).await.unwrap(), 3);

    // Duplicate delivery left two audit rows, one per delivery.
    assert_eq!(hx.executions.list_for_rule(rule.id, 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_legacy_flat_conditions_still_gate_dispatch() {
    let hx = harness(false).await;
    let project = seed_project(&hx.pool, "core").await;
    let task = Task::new(project, 1, "CORE-1", "Fix login");
    hx.tasks.create(&task).await.unwrap();

    let rule = Rule::new(
        Uuid::new_v4(),
        "legacy-rule",
        TriggerType::TaskUpdated,
        ActionKind::AddLabel,
        json!({"label": "stale"}),
        Uuid::new_v4(),
    )
    .with_conditions(json!({"task.status": {"not": "done"}, "task.priority": "low"}));
    hx.rules.insert(&rule).await.unwrap();

    let matching = TriggerJob::new(
        rule.id,
        TriggerType::TaskUpdated,
        json!({"task": {"id": task.id, "status": "todo", "priority": "low"}}),
    );
    let outcome = hx.orchestrator.execute(&matching).await.unwrap();
    assert!(!outcome.skipped);
    assert_eq!(hx.tasks.get(task.id).await.unwrap().unwrap().labels, vec!["stale"]);

    let unmatched = TriggerJob::new(
        rule.id,
        TriggerType::TaskUpdated,
        json!({"task": {"id": task.id, "status": "done", "priority": "low"}}),
    );
    assert!(hx.orchestrator.execute(&unmatched).await.unwrap().skipped);
}

#[tokio::test]
async fn test_execute_with_timeout_passes_through_fast_executions() {
    let hx = harness(false).await;
    let rule = change_status_rule();
    hx.rules.insert(&rule).await.unwrap();

    let job = TriggerJob::new(
        rule.id,
        TriggerType::TaskCreated,
        json!({"task": {"id": Uuid::new_v4(), "priority": "LOW"}}),
    );
    let outcome = hx
        .orchestrator
        .execute_with_timeout(&job, Duration::from_secs(5))
        .await
        .unwrap();
    assert!(outcome.skipped);
}
