//! Add-comment action handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{emit_or_warn, parse_config, ActionError, ActionHandler, ActionResult, TriggerContext};
use crate::domain::models::{ActionKind, Comment};
use crate::domain::ports::{CommentStore, EventNotifier};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddCommentConfig {
    body: String,
}

/// Posts a comment on the triggering task. The comment is attributed to
/// the member who caused the trigger, or to the automation system when
/// there is none.
pub struct AddCommentHandler {
    comments: Arc<dyn CommentStore>,
    notifier: Arc<dyn EventNotifier>,
}

impl AddCommentHandler {
    pub fn new(comments: Arc<dyn CommentStore>, notifier: Arc<dyn EventNotifier>) -> Self {
        Self { comments, notifier }
    }
}

#[async_trait]
impl ActionHandler for AddCommentHandler {
    fn kind(&self) -> ActionKind {
        ActionKind::AddComment
    }

    async fn execute(
        &self,
        config: &Value,
        ctx: &TriggerContext,
    ) -> Result<ActionResult, ActionError> {
        let cfg: AddCommentConfig = parse_config(config)?;
        if cfg.body.trim().is_empty() {
            return Err(ActionError::MissingField("body"));
        }

        let task_id = ctx.task_id()?;
        let comment = Comment::new(task_id, ctx.triggered_by, cfg.body);
        self.comments.create(&comment).await?;

        emit_or_warn(
            &self.notifier,
            "comment.added",
            json!({"taskId": task_id, "commentId": comment.id}),
        )
        .await;

        let mut data = Map::new();
        data.insert("taskId".to_string(), json!(task_id));
        data.insert("commentId".to_string(), json!(comment.id));
        Ok(ActionResult::ok(data))
    }
}
