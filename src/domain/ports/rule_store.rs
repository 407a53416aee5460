use crate::domain::errors::DomainResult;
use crate::domain::models::{Rule, RuleStatus, TriggerType};
use async_trait::async_trait;
use uuid::Uuid;

/// Filters for querying rules
#[derive(Default, Debug, Clone)]
pub struct RuleFilter {
    pub workspace_id: Option<Uuid>,
    pub status: Option<RuleStatus>,
    pub trigger_type: Option<TriggerType>,
}

/// Store port for rule definitions.
///
/// Rules are created and edited through the platform API; from the engine's
/// perspective a rule is read-only during one execution.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Fetch a rule by ID.
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Rule>>;

    /// Insert a new rule definition.
    async fn insert(&self, rule: &Rule) -> DomainResult<()>;

    /// List rules with optional filters.
    async fn list(&self, filter: RuleFilter) -> DomainResult<Vec<Rule>>;

    /// Flip a rule's enable/disable status.
    async fn set_status(&self, id: Uuid, status: RuleStatus) -> DomainResult<()>;
}
