pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod exclusivity;
pub mod multibuy;

pub use config::{ConfigError, EngineConfig};
pub use domain::cart::{CartLine, CartView, ProductId};
pub use domain::discount::DiscountResult;
pub use domain::rule::{Action, Condition, Rule, RuleId, RuleValue};
pub use engine::{
    ActionHandler, ActionOutcome, ActionRegistry, ConditionHandler, ConditionRegistry,
    ConflictPolicy, DiscountEngine, Evaluation,
};
pub use errors::EngineError;
pub use exclusivity::{plan_deactivations, ExclusivityPlan};
pub use multibuy::{multibuy_discount, MultibuyConfig};
