use async_trait::async_trait;
use thiserror::Error;

use promo_core::domain::rule::{Rule, RuleId};

pub mod memory;

pub use memory::InMemoryRuleRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("rule {0:?} not found")]
    NotFound(RuleId),
}

/// Storage contract for rule records.
///
/// Activation-state changes go through the repository so the
/// single-active-category invariant is applied as one batch over the whole
/// rule set, never as independent per-rule writes. The read path only asks
/// for consistent snapshots; it trusts the invariant was maintained here.
#[async_trait]
pub trait RuleRepository: Send + Sync {
    async fn find_by_id(&self, id: RuleId) -> Result<Option<Rule>, RepositoryError>;

    /// All rules sorted by priority, ties in id order.
    async fn list(&self) -> Result<Vec<Rule>, RepositoryError>;

    /// Active rules only, same ordering as `list`. This is the snapshot the
    /// discount engine evaluates.
    async fn list_active(&self) -> Result<Vec<Rule>, RepositoryError>;

    /// Persist a rule, assigning an id to new records. A rule saved without
    /// a category inherits its condition kind, and saving an active rule
    /// deactivates every other active rule outside its resolved category.
    async fn save(&self, rule: Rule) -> Result<RuleId, RepositoryError>;

    /// Remove a rule. Returns whether anything was deleted.
    async fn delete(&self, id: RuleId) -> Result<bool, RepositoryError>;

    /// Mark a rule active, deactivating competing categories.
    async fn activate(&self, id: RuleId) -> Result<(), RepositoryError>;

    /// Flip a rule's active state, returning the new state. Deactivation is
    /// a plain write; activation routes through the exclusivity path.
    async fn toggle(&self, id: RuleId) -> Result<bool, RepositoryError>;

    /// Distinct non-empty categories across all rules, in id order.
    async fn categories(&self) -> Result<Vec<String>, RepositoryError>;
}
