//! Integration tests for the SQLite rule store.

mod common;

use serde_json::json;
use uuid::Uuid;

use common::setup_test_db;
use flywheel::adapters::sqlite::SqliteRuleStore;
use flywheel::domain::ports::{RuleFilter, RuleStore};
use flywheel::{ActionKind, Rule, RuleStatus, TriggerType};

fn sample_rule(workspace_id: Uuid) -> Rule {
    Rule::new(
        workspace_id,
        "label-new-bugs",
        TriggerType::TaskCreated,
        ActionKind::AddLabel,
        json!({"label": "triage"}),
        Uuid::new_v4(),
    )
    .with_description("Label freshly created bug reports")
    .with_conditions(json!({"task.labels": {"contains": "bug"}}))
}

#[tokio::test]
async fn test_insert_and_find_round_trip() {
    let pool = setup_test_db().await;
    let store = SqliteRuleStore::new(pool);
    let rule = sample_rule(Uuid::new_v4());

    store.insert(&rule).await.unwrap();
    let loaded = store.find_by_id(rule.id).await.unwrap().unwrap();

    assert_eq!(loaded.id, rule.id);
    assert_eq!(loaded.name, "label-new-bugs");
    assert_eq!(loaded.trigger_type, TriggerType::TaskCreated);
    assert_eq!(loaded.action_kind, ActionKind::AddLabel);
    assert_eq!(loaded.conditions, rule.conditions);
    assert_eq!(loaded.action_config, rule.action_config);
    assert!(loaded.is_active());
}

#[tokio::test]
async fn test_find_unknown_rule_is_none() {
    let pool = setup_test_db().await;
    let store = SqliteRuleStore::new(pool);

    assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_filters_by_workspace_and_status() {
    let pool = setup_test_db().await;
    let store = SqliteRuleStore::new(pool);
    let workspace = Uuid::new_v4();

    let active = sample_rule(workspace);
    let inactive = sample_rule(workspace).with_status(RuleStatus::Inactive);
    let elsewhere = sample_rule(Uuid::new_v4());
    store.insert(&active).await.unwrap();
    store.insert(&inactive).await.unwrap();
    store.insert(&elsewhere).await.unwrap();

    let all_in_workspace = store
        .list(RuleFilter { workspace_id: Some(workspace), ..RuleFilter::default() })
        .await
        .unwrap();
    assert_eq!(all_in_workspace.len(), 2);

    let active_only = store
        .list(RuleFilter {
            workspace_id: Some(workspace),
            status: Some(RuleStatus::Active),
            ..RuleFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(active_only.len(), 1);
    assert_eq!(active_only[0].id, active.id);
}

#[tokio::test]
async fn test_set_status_flips_lifecycle() {
    let pool = setup_test_db().await;
    let store = SqliteRuleStore::new(pool);
    let rule = sample_rule(Uuid::new_v4());
    store.insert(&rule).await.unwrap();

    store.set_status(rule.id, RuleStatus::Inactive).await.unwrap();
    assert!(!store.find_by_id(rule.id).await.unwrap().unwrap().is_active());

    store.set_status(rule.id, RuleStatus::Active).await.unwrap();
    assert!(store.find_by_id(rule.id).await.unwrap().unwrap().is_active());
}

#[tokio::test]
async fn test_set_status_on_unknown_rule_errors() {
    let pool = setup_test_db().await;
    let store = SqliteRuleStore::new(pool);

    assert!(store.set_status(Uuid::new_v4(), RuleStatus::Inactive).await.is_err());
}
