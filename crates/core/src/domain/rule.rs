use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rule identifier assigned by the repository on first save. Zero means the
/// rule has not been persisted yet.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RuleId(pub u64);

/// Built-in condition type keys.
pub mod condition_kind {
    pub const CART_TOTAL: &str = "cart_total";
    pub const ITEM_COUNT: &str = "item_count";
    pub const SPECIFIC_PRODUCT: &str = "specific_product";
    pub const PRODUCT_COUNT: &str = "product_count";
}

/// Built-in action type keys.
pub mod action_kind {
    pub const PERCENTAGE_DISCOUNT: &str = "percentage_discount";
    pub const FIXED_DISCOUNT: &str = "fixed_discount";
    pub const FREE_SHIPPING: &str = "free_shipping";
    pub const CHEAPEST_FREE: &str = "cheapest_free";
    pub const MOST_EXPENSIVE_FREE: &str = "most_expensive_free";
    pub const NTH_CHEAPEST_FREE: &str = "nth_cheapest_free";
    pub const NTH_EXPENSIVE_FREE: &str = "nth_expensive_free";
}

/// Configured rule value. Rule records come from loosely typed admin input,
/// so numeric reads parse on demand and return `None` for anything that is
/// not a number; a bad value makes one rule unsatisfiable, never the whole
/// evaluation pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Number(Decimal),
    Text(String),
}

impl RuleValue {
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Integer view, truncating any fractional part.
    pub fn as_integer(&self) -> Option<i64> {
        self.as_decimal().and_then(|number| number.trunc().to_i64())
    }

    pub fn as_text(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

impl From<Decimal> for RuleValue {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: String,
    pub value: RuleValue,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl Condition {
    pub fn new(kind: impl Into<String>, value: impl Into<RuleValue>) -> Self {
        Self { kind: kind.into(), value: value.into(), params: BTreeMap::new() }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Cart subtotal at or above the given amount.
    pub fn cart_total(min_subtotal: Decimal) -> Self {
        Self::new(condition_kind::CART_TOTAL, min_subtotal)
    }

    /// Total unit quantity at or above the given count.
    pub fn item_count(min_items: u32) -> Self {
        Self::new(condition_kind::ITEM_COUNT, Decimal::from(min_items))
    }

    /// A given product present with at least `min_quantity` units
    /// (parameterized via `min_quantity`, default 1).
    pub fn specific_product(product_id: impl Into<String>) -> Self {
        Self::new(condition_kind::SPECIFIC_PRODUCT, RuleValue::Text(product_id.into()))
    }

    /// At least the given number of distinct products in the cart.
    pub fn product_count(min_distinct: u32) -> Self {
        Self::new(condition_kind::PRODUCT_COUNT, Decimal::from(min_distinct))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: String,
    pub value: Decimal,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// An exclusive action stops the evaluation pass once it fires with an
    /// effective result.
    #[serde(default)]
    pub exclusive: bool,
}

impl Action {
    pub fn new(kind: impl Into<String>, value: Decimal) -> Self {
        Self { kind: kind.into(), value, params: BTreeMap::new(), exclusive: false }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    pub fn percentage_discount(percent: Decimal) -> Self {
        Self::new(action_kind::PERCENTAGE_DISCOUNT, percent)
    }

    pub fn fixed_discount(amount: Decimal) -> Self {
        Self::new(action_kind::FIXED_DISCOUNT, amount)
    }

    pub fn free_shipping() -> Self {
        Self::new(action_kind::FREE_SHIPPING, Decimal::ZERO)
    }

    pub fn cheapest_free() -> Self {
        Self::new(action_kind::CHEAPEST_FREE, Decimal::ZERO)
    }

    pub fn most_expensive_free() -> Self {
        Self::new(action_kind::MOST_EXPENSIVE_FREE, Decimal::ZERO)
    }

    pub fn nth_cheapest_free(position: u32) -> Self {
        Self::new(action_kind::NTH_CHEAPEST_FREE, Decimal::ZERO)
            .with_param("position", position.to_string())
    }

    pub fn nth_expensive_free(position: u32) -> Self {
        Self::new(action_kind::NTH_EXPENSIVE_FREE, Decimal::ZERO)
            .with_param("position", position.to_string())
    }

    /// 1-based position for the nth-free variants, default 1. A value that
    /// does not parse falls back to the default rather than failing.
    pub fn position_param(&self) -> i64 {
        self.params.get("position").and_then(|raw| raw.trim().parse().ok()).unwrap_or(1)
    }
}

fn default_priority() -> i32 {
    10
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub id: RuleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Grouping key for mutual exclusivity. Empty means "not set"; the
    /// repository defaults it to the condition kind on save.
    #[serde(default)]
    pub category: String,
    /// Lower value is evaluated first.
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
    pub condition: Condition,
    pub action: Action,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Rule {
    pub fn new(name: impl Into<String>, condition: Condition, action: Action) -> Self {
        Self {
            id: RuleId(0),
            name: name.into(),
            description: String::new(),
            category: String::new(),
            priority: default_priority(),
            active: true,
            condition,
            action,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: RuleId) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// The category the exclusivity invariant groups this rule under: the
    /// explicit category when set, otherwise the condition kind.
    pub fn resolved_category(&self) -> &str {
        if self.category.is_empty() { &self.condition.kind } else { &self.category }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.0 > 0
    }
}
