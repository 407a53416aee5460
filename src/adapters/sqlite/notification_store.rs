//! SQLite implementations of the `NotificationStore` and `CommentStore`.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Comment, Notification};
use crate::domain::ports::{CommentStore, NotificationStore};

#[derive(Clone)]
pub struct SqliteNotificationStore {
    pool: SqlitePool,
}

impl SqliteNotificationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for SqliteNotificationStore {
    async fn create_many(&self, notifications: &[Notification]) -> DomainResult<()> {
        if notifications.is_empty() {
            return Ok(());
        }

        // One transaction: the batch is a single mutation from the
        // handler's point of view.
        let mut tx = self.pool.begin().await?;
        for n in notifications {
            sqlx::query(
                r#"INSERT INTO notifications (id, recipient_id, kind, title, body, task_id, is_read, created_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(n.id.to_string())
            .bind(n.recipient_id.to_string())
            .bind(&n.kind)
            .bind(&n.title)
            .bind(&n.body)
            .bind(n.task_id.map(|id| id.to_string()))
            .bind(i64::from(n.is_read))
            .bind(n.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct SqliteCommentStore {
    pool: SqlitePool,
}

impl SqliteCommentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for SqliteCommentStore {
    async fn create(&self, comment: &Comment) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO comments (id, task_id, author_id, body, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(comment.id.to_string())
        .bind(comment.task_id.to_string())
        .bind(comment.author_id.map(|id| id.to_string()))
        .bind(&comment.body)
        .bind(comment.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
