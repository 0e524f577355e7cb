pub mod actions;
pub mod conditions;
pub mod conflicts;

use crate::domain::cart::CartView;
use crate::domain::discount::DiscountResult;
use crate::domain::rule::Rule;
use crate::errors::EngineError;

pub use actions::{ActionHandler, ActionOutcome, ActionRegistry};
pub use conditions::{ConditionHandler, ConditionRegistry};
pub use conflicts::ConflictPolicy;

/// Outcome of one evaluation pass.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub discounts: Vec<DiscountResult>,
    /// The category the pass was restricted to, when any active rule carried
    /// a non-empty category.
    pub active_category: Option<String>,
    /// Categories that also had active rules even though the store keeps at
    /// most one category active. The first category encountered in priority
    /// order wins; the others are reported here for callers to log, never
    /// repaired mid-read.
    pub ignored_categories: Vec<String>,
}

/// Orchestrator for the read path: selects active rules, restricts them to
/// the single active category, evaluates conditions in priority order,
/// computes actions, resolves conflicts, and returns the final discounts.
///
/// Evaluation is pure and request-scoped: the cart snapshot and rule
/// snapshot are immutable inputs and no state survives the call, so one
/// engine value can serve concurrent requests.
pub struct DiscountEngine {
    conditions: ConditionRegistry,
    actions: ActionRegistry,
    conflicts: ConflictPolicy,
}

impl Default for DiscountEngine {
    fn default() -> Self {
        Self {
            conditions: ConditionRegistry::builtin(),
            actions: ActionRegistry::builtin(),
            conflicts: ConflictPolicy::default(),
        }
    }
}

impl DiscountEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry handles for registering extension condition/action types and
    /// family assignments.
    pub fn conditions_mut(&mut self) -> &mut ConditionRegistry {
        &mut self.conditions
    }

    pub fn actions_mut(&mut self) -> &mut ActionRegistry {
        &mut self.actions
    }

    pub fn conflicts_mut(&mut self) -> &mut ConflictPolicy {
        &mut self.conflicts
    }

    /// Primary read-path entry point. `None` means the host had no cart to
    /// hand over; that is the one input error callers must handle, since no
    /// empty-cart default can stand in for it.
    pub fn calculate_discounts(
        &self,
        cart: Option<&CartView>,
        rules: &[Rule],
    ) -> Result<Vec<DiscountResult>, EngineError> {
        Ok(self.evaluate(cart, rules)?.discounts)
    }

    /// Full evaluation pass, also reporting the category restriction that
    /// was applied.
    pub fn evaluate(
        &self,
        cart: Option<&CartView>,
        rules: &[Rule],
    ) -> Result<Evaluation, EngineError> {
        let cart = cart.ok_or(EngineError::MissingCart)?;

        let mut working: Vec<&Rule> = rules.iter().filter(|rule| rule.active).collect();
        // Stable sort: priority ties keep the snapshot's order, which
        // repositories hand out in id order.
        working.sort_by_key(|rule| rule.priority);

        let active_category = working
            .iter()
            .find(|rule| !rule.category.is_empty())
            .map(|rule| rule.category.clone());

        let mut ignored_categories: Vec<String> = Vec::new();
        if let Some(category) = &active_category {
            for rule in &working {
                if !rule.category.is_empty()
                    && rule.category != *category
                    && !ignored_categories.contains(&rule.category)
                {
                    ignored_categories.push(rule.category.clone());
                }
            }
            working.retain(|rule| rule.category == *category);
        }

        let mut candidates = Vec::new();
        for rule in working {
            // A rule missing its condition or action type contributes no
            // discount and must not abort the pass.
            if rule.condition.kind.is_empty() || rule.action.kind.is_empty() {
                continue;
            }
            if !self.conditions.evaluate(&rule.condition, cart) {
                continue;
            }

            let outcome = self.actions.compute(&rule.action, cart);
            let result = DiscountResult {
                rule_id: rule.id,
                rule_name: rule.name.clone(),
                category: rule.category.clone(),
                action_kind: rule.action.kind.clone(),
                amount: outcome.amount,
                free_shipping: outcome.free_shipping,
                conflict: false,
                exclusive: rule.action.exclusive,
            };

            let stop = rule.action.exclusive && result.is_effective();
            candidates.push(result);
            if stop {
                break;
            }
        }

        let mut discounts = self.conflicts.resolve(candidates);
        // Entries that neither discount nor grant free shipping are noise,
        // unless they document a suppressed conflict.
        discounts.retain(|result| result.is_effective() || result.conflict);

        Ok(Evaluation { discounts, active_category, ignored_categories })
    }
}
