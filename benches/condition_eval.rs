//! Condition evaluator benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use flywheel::engine::conditions::evaluate;
use flywheel::ConditionSpec;

fn payload() -> serde_json::Value {
    json!({
        "task": {
            "id": "a3c7e9d0-6a1f-4a5e-9f2b-8f6f0f1c2d3e",
            "title": "Fix urgent login regression in the session refresh path",
            "priority": "high",
            "status": "in_progress",
            "estimate": 8,
            "labels": ["bug", "auth", "regression"],
            "meta": {"origin": "support", "escalations": 3}
        },
        "actor": {"name": "dana", "role": "admin"}
    })
}

fn wide_tree() -> serde_json::Value {
    json!({
        "op": "and",
        "conditions": [
            {"op": "equals", "field": "task.priority", "value": "high"},
            {"op": "not_equals", "field": "task.status", "value": "done"},
            {"op": "in", "field": "task.labels", "values": ["bug", "incident"]},
            {"op": "contains", "field": "task.title", "value": "regression"},
            {"op": "gt", "field": "task.meta.escalations", "value": 1},
            {"op": "or", "conditions": [
                {"op": "equals", "field": "actor.role", "value": "admin"},
                {"op": "is_not_empty", "field": "task.assignees"}
            ]}
        ]
    })
}

fn legacy_map() -> serde_json::Value {
    json!({
        "task.priority": "high",
        "task.status": {"not": "done"},
        "task.labels": {"in": ["bug", "incident"]},
        "task.title": {"contains": "regression"}
    })
}

fn bench_parse(c: &mut Criterion) {
    let tree = wide_tree();
    let legacy = legacy_map();

    c.bench_function("parse_tagged_tree", |b| {
        b.iter(|| ConditionSpec::parse(black_box(&tree)).unwrap());
    });
    c.bench_function("parse_legacy_map", |b| {
        b.iter(|| ConditionSpec::parse(black_box(&legacy)).unwrap());
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let payload = payload();
    let tree = ConditionSpec::parse(&wide_tree()).unwrap();
    let legacy = ConditionSpec::parse(&legacy_map()).unwrap();

    c.bench_function("evaluate_tagged_tree", |b| {
        b.iter(|| evaluate(black_box(&tree), black_box(&payload)));
    });
    c.bench_function("evaluate_legacy_map", |b| {
        b.iter(|| evaluate(black_box(&legacy), black_box(&payload)));
    });
}

criterion_group!(benches, bench_parse, bench_evaluate);
criterion_main!(benches);
