//! SQLite implementation of the `TaskStore`.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_datetime, parse_optional_datetime, parse_optional_uuid, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Task, TaskPriority};
use crate::domain::ports::TaskStore;

#[derive(Clone)]
pub struct SqliteTaskStore {
    pool: SqlitePool,
}

impl SqliteTaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    project_id: String,
    sequence: i64,
    slug: String,
    title: String,
    description: String,
    status: String,
    priority: String,
    assignees: String,
    labels: String,
    due_date: Option<String>,
    created_by: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = DomainError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let priority = TaskPriority::from_str(&row.priority).ok_or_else(|| {
            DomainError::SerializationError(format!("bad task priority '{}'", row.priority))
        })?;
        let assignee_ids: Vec<String> = serde_json::from_str(&row.assignees)?;
        let assignee_ids = assignee_ids
            .iter()
            .map(|s| parse_uuid(s))
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Task {
            id: parse_uuid(&row.id)?,
            project_id: parse_uuid(&row.project_id)?,
            sequence: row.sequence,
            slug: row.slug,
            title: row.title,
            description: row.description,
            status: row.status,
            priority,
            assignee_ids,
            labels: serde_json::from_str(&row.labels)?,
            due_date: parse_optional_datetime(row.due_date)?,
            created_by: parse_optional_uuid(row.created_by)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

fn assignees_json(task: &Task) -> DomainResult<String> {
    let ids: Vec<String> = task.assignee_ids.iter().map(Uuid::to_string).collect();
    Ok(serde_json::to_string(&ids)?)
}

/// Map a unique-index violation on (project_id, slug) to the domain error
/// the create-task handler expects.
fn map_slug_conflict(err: sqlx::Error, task: &Task) -> DomainError {
    if let sqlx::Error::Database(ref db) = err {
        if db.message().contains("tasks.project_id") && db.message().contains("tasks.slug") {
            return DomainError::DuplicateSlug {
                project_id: task.project_id,
                slug: task.slug.clone(),
            };
        }
    }
    err.into()
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn get(&self, id: Uuid) -> DomainResult<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Task::try_from).transpose()
    }

    async fn create(&self, task: &Task) -> DomainResult<()> {
        sqlx::query(
            r#"INSERT INTO tasks (id, project_id, sequence, slug, title, description,
               status, priority, assignees, labels, due_date, created_by, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(task.id.to_string())
        .bind(task.project_id.to_string())
        .bind(task.sequence)
        .bind(&task.slug)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(task.priority.as_str())
        .bind(assignees_json(task)?)
        .bind(serde_json::to_string(&task.labels)?)
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .bind(task.created_by.map(|id| id.to_string()))
        .bind(task.created_at.to_rfc3339())
        .bind(task.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_slug_conflict(e, task))?;

        Ok(())
    }

    async fn update(&self, task: &Task) -> DomainResult<()> {
        let result = sqlx::query(
            r#"UPDATE tasks SET title = ?, description = ?, status = ?, priority = ?,
               assignees = ?, labels = ?, due_date = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.status)
        .bind(task.priority.as_str())
        .bind(assignees_json(task)?)
        .bind(serde_json::to_string(&task.labels)?)
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .bind(task.updated_at.to_rfc3339())
        .bind(task.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TaskNotFound(task.id));
        }

        Ok(())
    }

    async fn next_sequence(&self, project_id: Uuid) -> DomainResult<i64> {
        let (max,): (i64,) =
            sqlx::query_as("SELECT COALESCE(MAX(sequence), 0) FROM tasks WHERE project_id = ?")
                .bind(project_id.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(max + 1)
    }

    async fn project_slug(&self, project_id: Uuid) -> DomainResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT slug FROM projects WHERE id = ?")
            .bind(project_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(slug,)| slug))
    }
}
