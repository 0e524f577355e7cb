pub mod repositories;

pub use repositories::{InMemoryRuleRepository, RepositoryError, RuleRepository};
