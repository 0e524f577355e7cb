use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::discount::DiscountResult;
use crate::domain::rule::action_kind;

/// Family identifiers used by the built-in table.
pub mod family {
    pub const PERCENTAGE: &str = "percentage";
    pub const FIXED: &str = "fixed";
    pub const FREE_ITEM: &str = "free_item";
    pub const FREE_SHIPPING: &str = "free_shipping";
}

/// Built-in action-kind to family assignments. Extending an existing family
/// with a new action kind is a data change here (or an `assign` call at
/// runtime), not a control-flow change.
const FAMILY_TABLE: &[(&str, &str)] = &[
    (action_kind::PERCENTAGE_DISCOUNT, family::PERCENTAGE),
    (action_kind::FIXED_DISCOUNT, family::FIXED),
    (action_kind::CHEAPEST_FREE, family::FREE_ITEM),
    (action_kind::MOST_EXPENSIVE_FREE, family::FREE_ITEM),
    (action_kind::NTH_CHEAPEST_FREE, family::FREE_ITEM),
    (action_kind::NTH_EXPENSIVE_FREE, family::FREE_ITEM),
    (action_kind::FREE_SHIPPING, family::FREE_SHIPPING),
];

/// Post-processing step over one pass's candidates: within any family that
/// produced more than one positive-amount discount, only the largest
/// survives; the rest are rewritten to a zero amount with the conflict flag
/// set. Free-shipping grants are boolean and idempotent, so that family is
/// never resolved, and kinds outside every family never conflict.
#[derive(Clone, Debug)]
pub struct ConflictPolicy {
    families: BTreeMap<String, String>,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        let families = FAMILY_TABLE
            .iter()
            .map(|(kind, family)| ((*kind).to_string(), (*family).to_string()))
            .collect();
        Self { families }
    }
}

impl ConflictPolicy {
    /// Map an action kind (built-in or extension) into a family.
    pub fn assign(&mut self, kind: impl Into<String>, family: impl Into<String>) {
        self.families.insert(kind.into(), family.into());
    }

    pub fn family_of(&self, kind: &str) -> Option<&str> {
        self.families.get(kind).map(String::as_str)
    }

    /// Resolve conflicts across the candidate list. The list keeps its
    /// length and order; losers keep their identity but lose their amount.
    pub fn resolve(&self, mut candidates: Vec<DiscountResult>) -> Vec<DiscountResult> {
        // First pass: per family, the index of the largest positive amount.
        // Ties keep the first encountered, which is priority order.
        let mut winners: BTreeMap<&str, (usize, Decimal)> = BTreeMap::new();
        for (index, candidate) in candidates.iter().enumerate() {
            if candidate.amount <= Decimal::ZERO {
                continue;
            }
            let Some(family) = self.family_of(&candidate.action_kind) else {
                continue;
            };
            if family == family::FREE_SHIPPING {
                continue;
            }
            match winners.get(family) {
                Some((_, best)) if *best >= candidate.amount => {}
                _ => {
                    winners.insert(family, (index, candidate.amount));
                }
            }
        }

        // Second pass: suppress every other positive candidate in a family
        // that has a winner.
        for (index, candidate) in candidates.iter_mut().enumerate() {
            if candidate.amount <= Decimal::ZERO {
                continue;
            }
            let Some(family) = self.family_of(&candidate.action_kind) else {
                continue;
            };
            if let Some((winner, _)) = winners.get(family) {
                if *winner != index {
                    candidate.suppress();
                }
            }
        }

        candidates
    }
}
