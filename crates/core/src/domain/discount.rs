use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::rule::RuleId;

/// One discount produced by an evaluation pass. Candidates suppressed by
/// conflict resolution stay in the list with a zero amount and the
/// `conflict` flag set, so callers can keep them for diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscountResult {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub category: String,
    pub action_kind: String,
    /// Non-negative amount to subtract from the cart total. Zero when the
    /// action does not discount (free shipping) or was suppressed.
    pub amount: Decimal,
    pub free_shipping: bool,
    pub conflict: bool,
    /// Copied from the rule's action; tells the orchestrator this result
    /// ended the evaluation pass.
    pub exclusive: bool,
}

impl DiscountResult {
    /// Whether this result actually changes the order: a positive amount or
    /// a free-shipping grant.
    pub fn is_effective(&self) -> bool {
        self.amount > Decimal::ZERO || self.free_shipping
    }

    /// Rewrite this candidate as the loser of a conflict.
    pub fn suppress(&mut self) {
        self.amount = Decimal::ZERO;
        self.conflict = true;
    }
}
