//! Write-path category exclusivity.
//!
//! At most one rule category may hold active rules at a time. The invariant
//! is enforced where rules change, not on every cart evaluation: this module
//! computes the batch of deactivations a save/activation requires, and the
//! repository persists the whole batch together with the activated rule in
//! one write. Splitting compute from persist keeps this function pure and
//! lets the store apply the plan atomically instead of issuing independent
//! per-rule writes that concurrent activations could interleave.

use serde::{Deserialize, Serialize};

use crate::domain::rule::{Rule, RuleId};

/// Deactivation batch required before a rule may be the active category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusivityPlan {
    /// The category the activated rule resolves to.
    pub category: String,
    /// Every other currently active rule stored under a different category.
    pub deactivate: Vec<RuleId>,
}

impl ExclusivityPlan {
    pub fn is_noop(&self) -> bool {
        self.deactivate.is_empty()
    }
}

/// Compute which rules must be deactivated so that `rule` can be active.
///
/// The rule's resolved category is its explicit category when set, otherwise
/// its condition kind. A rule that resolves to no category at all (no
/// category and no condition kind) plans nothing. Other rules are matched on
/// their *stored* category, so active rules that never had a category set
/// are deactivated along with rules from competing categories.
pub fn plan_deactivations(rule: &Rule, all_rules: &[Rule]) -> ExclusivityPlan {
    let category = rule.resolved_category().to_string();
    if category.is_empty() {
        return ExclusivityPlan { category, deactivate: Vec::new() };
    }

    let deactivate = all_rules
        .iter()
        .filter(|other| other.id != rule.id)
        .filter(|other| other.active)
        .filter(|other| other.category != category)
        .map(|other| other.id)
        .collect();

    ExclusivityPlan { category, deactivate }
}
