//! Pure condition evaluator.
//!
//! `evaluate` is a pure function of (spec, payload): no I/O, no hidden
//! state, independently testable with literal fixtures. Field references
//! are dot-paths resolved against the trigger payload; a missing hop
//! resolves to "undefined", and every comparison against undefined except
//! the emptiness checks evaluates false.

use serde_json::Value;

use crate::domain::models::ConditionSpec;

/// Evaluate a condition tree against a trigger payload.
pub fn evaluate(spec: &ConditionSpec, payload: &Value) -> bool {
    match spec {
        ConditionSpec::And { conditions } => conditions.iter().all(|c| evaluate(c, payload)),
        ConditionSpec::Or { conditions } => conditions.iter().any(|c| evaluate(c, payload)),

        ConditionSpec::Equals { field, value } => {
            resolve(field, payload).is_some_and(|v| values_equal(v, value))
        }
        ConditionSpec::NotEquals { field, value } => {
            resolve(field, payload).is_some_and(|v| !values_equal(v, value))
        }
        ConditionSpec::In { field, values } => {
            resolve(field, payload).is_some_and(|v| value_in(v, values))
        }
        ConditionSpec::NotIn { field, values } => {
            resolve(field, payload).is_some_and(|v| !value_in(v, values))
        }
        ConditionSpec::Contains { field, value } => {
            resolve(field, payload).is_some_and(|v| contains(v, value))
        }
        ConditionSpec::StartsWith { field, value } => resolve(field, payload)
            .and_then(Value::as_str)
            .is_some_and(|s| s.starts_with(value.as_str())),
        ConditionSpec::EndsWith { field, value } => resolve(field, payload)
            .and_then(Value::as_str)
            .is_some_and(|s| s.ends_with(value.as_str())),

        ConditionSpec::Gt { field, value } => compare_numeric(field, payload, value, |a, b| a > b),
        ConditionSpec::Gte { field, value } => compare_numeric(field, payload, value, |a, b| a >= b),
        ConditionSpec::Lt { field, value } => compare_numeric(field, payload, value, |a, b| a < b),
        ConditionSpec::Lte { field, value } => compare_numeric(field, payload, value, |a, b| a <= b),

        ConditionSpec::IsEmpty { field } => is_empty(resolve(field, payload)),
        ConditionSpec::IsNotEmpty { field } => !is_empty(resolve(field, payload)),
    }
}

/// Walk a dot-path (`a.b.c`) through nested objects. Any missing hop, or a
/// hop through a non-object, yields `None`, never an error.
fn resolve<'a>(field: &str, payload: &'a Value) -> Option<&'a Value> {
    let mut current = payload;
    for segment in field.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Loose equality: JSON equality, with numbers compared by value so that
/// `1` and `1.0` agree.
fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (as_number(lhs), as_number(rhs)) {
        (Some(a), Some(b)) if lhs.is_number() && rhs.is_number() => (a - b).abs() < f64::EPSILON,
        _ => lhs == rhs,
    }
}

fn value_in(needle: &Value, haystack: &[Value]) -> bool {
    match needle {
        // An array field is a member when any of its elements is listed.
        Value::Array(items) => items.iter().any(|item| haystack.iter().any(|h| values_equal(h, item))),
        scalar => haystack.iter().any(|h| values_equal(h, scalar)),
    }
}

/// Substring match on strings, membership on arrays. Other shapes never
/// contain anything.
fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::String(s) => needle.as_str().is_some_and(|n| s.contains(n)),
        Value::Array(items) => items.iter().any(|item| values_equal(item, needle)),
        _ => false,
    }
}

/// Numeric coercion: JSON numbers directly, strings via parse. Everything
/// else is not a number.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce both sides to numbers; non-numeric input on either side yields
/// false, not an error.
fn compare_numeric(field: &str, payload: &Value, rhs: &Value, cmp: fn(f64, f64) -> bool) -> bool {
    let Some(lhs) = resolve(field, payload).and_then(as_number) else {
        return false;
    };
    let Some(rhs) = as_number(rhs) else {
        return false;
    };
    cmp(lhs, rhs)
}

/// Undefined, null, `""`, `[]` and `{}` are all empty.
fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}
