//! Condition spec: the boolean expression gating a rule's action.
//!
//! Two wire forms are accepted. The current form is a tagged tree:
//!
//! ```json
//! {"op": "and", "conditions": [
//!     {"op": "equals", "field": "task.priority", "value": "high"},
//!     {"op": "in", "field": "task.labels", "values": ["bug", "regression"]}
//! ]}
//! ```
//!
//! The legacy flat form is a map of field to predicate, combined with an
//! implicit AND. It is translated into the tree at parse time so there is a
//! single evaluation path:
//!
//! ```json
//! {"task.priority": "high", "task.status": {"not": "done"}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while parsing a condition spec.
///
/// The orchestrator treats these as "condition not met" rather than a hard
/// failure, so one malformed rule cannot block the trigger queue.
#[derive(Debug, Error)]
pub enum ConditionError {
    #[error("Unknown condition operator '{0}'")]
    UnknownOperator(String),

    #[error("Malformed condition spec: {0}")]
    Malformed(String),

    #[error("Condition spec must be an object, array, or null, got {0}")]
    UnexpectedShape(&'static str),
}

/// A node in the condition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ConditionSpec {
    Equals { field: String, value: Value },
    NotEquals { field: String, value: Value },
    In { field: String, values: Vec<Value> },
    NotIn { field: String, values: Vec<Value> },
    Contains { field: String, value: Value },
    StartsWith { field: String, value: String },
    EndsWith { field: String, value: String },
    Gt { field: String, value: Value },
    Gte { field: String, value: Value },
    Lt { field: String, value: Value },
    Lte { field: String, value: Value },
    IsEmpty { field: String },
    IsNotEmpty { field: String },
    And { conditions: Vec<ConditionSpec> },
    Or { conditions: Vec<ConditionSpec> },
}

impl ConditionSpec {
    /// A spec that matches every payload.
    pub fn always() -> Self {
        Self::And { conditions: Vec::new() }
    }

    /// Parse a raw spec as stored on a rule.
    ///
    /// `null`, `{}` and `[]` all mean "always match". An object carrying an
    /// `op` key is the tagged tree; any other object is the legacy flat map.
    /// An array is an implicit AND over its elements.
    pub fn parse(raw: &Value) -> Result<Self, ConditionError> {
        match raw {
            Value::Null => Ok(Self::always()),
            Value::Array(items) => {
                let conditions = items
                    .iter()
                    .map(Self::parse)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::And { conditions })
            }
            Value::Object(map) if map.is_empty() => Ok(Self::always()),
            Value::Object(map) => {
                if map.contains_key("op") {
                    serde_json::from_value(raw.clone())
                        .map_err(|e| ConditionError::Malformed(e.to_string()))
                } else {
                    translate_legacy(map)
                }
            }
            Value::Bool(_) => Err(ConditionError::UnexpectedShape("boolean")),
            Value::Number(_) => Err(ConditionError::UnexpectedShape("number")),
            Value::String(_) => Err(ConditionError::UnexpectedShape("string")),
        }
    }
}

/// Translate the legacy flat map into an implicit AND of per-field checks.
fn translate_legacy(map: &serde_json::Map<String, Value>) -> Result<ConditionSpec, ConditionError> {
    let mut conditions = Vec::new();

    for (field, predicate) in map {
        match predicate {
            Value::Object(ops) => {
                for (op, operand) in ops {
                    conditions.push(translate_legacy_op(field, op, operand)?);
                }
            }
            // A bare literal is shorthand for equality.
            literal => conditions.push(ConditionSpec::Equals {
                field: field.clone(),
                value: literal.clone(),
            }),
        }
    }

    Ok(ConditionSpec::And { conditions })
}

fn translate_legacy_op(
    field: &str,
    op: &str,
    operand: &Value,
) -> Result<ConditionSpec, ConditionError> {
    let field = field.to_string();
    match op {
        "equals" => Ok(ConditionSpec::Equals { field, value: operand.clone() }),
        "not" => Ok(ConditionSpec::NotEquals { field, value: operand.clone() }),
        "contains" => Ok(ConditionSpec::Contains { field, value: operand.clone() }),
        "in" => match operand {
            Value::Array(values) => Ok(ConditionSpec::In { field, values: values.clone() }),
            // A scalar membership list degrades to equality.
            scalar => Ok(ConditionSpec::Equals { field, value: scalar.clone() }),
        },
        other => Err(ConditionError::UnknownOperator(other.to_string())),
    }
}
