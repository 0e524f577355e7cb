use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::cart::{CartView, ProductId};
use crate::domain::rule::{condition_kind, Condition};

/// Predicate deciding whether a rule's condition holds for a cart snapshot.
/// Implementations must be pure: same inputs, same answer, no side effects.
pub trait ConditionHandler: Send + Sync {
    fn matches(&self, condition: &Condition, cart: &CartView) -> bool;
}

impl<F> ConditionHandler for F
where
    F: Fn(&Condition, &CartView) -> bool + Send + Sync,
{
    fn matches(&self, condition: &Condition, cart: &CartView) -> bool {
        self(condition, cart)
    }
}

/// Open registry of condition types. The built-in types are pre-registered;
/// callers register handlers for extension types without touching engine
/// code. Unknown or unregistered kinds never match.
#[derive(Clone)]
pub struct ConditionRegistry {
    handlers: HashMap<String, Arc<dyn ConditionHandler>>,
}

impl ConditionRegistry {
    /// Registry with no handlers at all, for callers that want full control
    /// over the condition vocabulary.
    pub fn empty() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// Registry with the built-in condition types.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(condition_kind::CART_TOTAL, cart_total_met);
        registry.register(condition_kind::ITEM_COUNT, item_count_met);
        registry.register(condition_kind::SPECIFIC_PRODUCT, specific_product_met);
        registry.register(condition_kind::PRODUCT_COUNT, product_count_met);
        registry
    }

    pub fn register(
        &mut self,
        kind: impl Into<String>,
        handler: impl ConditionHandler + 'static,
    ) {
        self.handlers.insert(kind.into(), Arc::new(handler));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn evaluate(&self, condition: &Condition, cart: &CartView) -> bool {
        match self.handlers.get(&condition.kind) {
            Some(handler) => handler.matches(condition, cart),
            None => false,
        }
    }
}

fn cart_total_met(condition: &Condition, cart: &CartView) -> bool {
    // A negative or unparseable threshold is unsatisfiable, not an error.
    match condition.value.as_decimal() {
        Some(min) if min >= Decimal::ZERO => cart.subtotal >= min,
        _ => false,
    }
}

fn item_count_met(condition: &Condition, cart: &CartView) -> bool {
    match condition.value.as_integer() {
        Some(min) if min >= 0 => i64::from(cart.item_count) >= min,
        _ => false,
    }
}

fn specific_product_met(condition: &Condition, cart: &CartView) -> bool {
    let product_id = ProductId(condition.value.as_text());
    if product_id.0.is_empty() {
        return false;
    }

    let min_quantity = condition
        .params
        .get("min_quantity")
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .unwrap_or(1);

    cart.quantity_of(&product_id) >= min_quantity
}

fn product_count_met(condition: &Condition, cart: &CartView) -> bool {
    match condition.value.as_integer() {
        Some(min) if min >= 0 => cart.distinct_product_count() as i64 >= min,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::ConditionRegistry;
    use crate::domain::cart::{CartLine, CartView, ProductId};
    use crate::domain::rule::{Condition, RuleValue};

    fn cart() -> CartView {
        CartView::from_lines(vec![
            CartLine { product_id: ProductId("a".to_string()), unit_price: Decimal::new(2500, 2), quantity: 2 },
            CartLine { product_id: ProductId("b".to_string()), unit_price: Decimal::new(5000, 2), quantity: 1 },
        ])
    }

    #[test]
    fn cart_total_compares_against_the_subtotal() {
        let registry = ConditionRegistry::builtin();

        assert!(registry.evaluate(&Condition::cart_total(Decimal::new(10_000, 2)), &cart()));
        assert!(!registry.evaluate(&Condition::cart_total(Decimal::new(10_001, 2)), &cart()));
    }

    #[test]
    fn negative_or_garbage_thresholds_never_match() {
        let registry = ConditionRegistry::builtin();
        let negative = Condition::cart_total(Decimal::new(-100, 2));
        let garbage = Condition::new("cart_total", RuleValue::Text("lots".to_string()));

        assert!(!registry.evaluate(&negative, &cart()));
        assert!(!registry.evaluate(&garbage, &cart()));
    }

    #[test]
    fn item_count_uses_total_unit_quantity() {
        let registry = ConditionRegistry::builtin();

        assert!(registry.evaluate(&Condition::item_count(3), &cart()));
        assert!(!registry.evaluate(&Condition::item_count(4), &cart()));
    }

    #[test]
    fn specific_product_sums_quantity_and_honors_min_quantity() {
        let registry = ConditionRegistry::builtin();

        assert!(registry.evaluate(&Condition::specific_product("a"), &cart()));
        assert!(registry
            .evaluate(&Condition::specific_product("a").with_param("min_quantity", "2"), &cart()));
        assert!(!registry
            .evaluate(&Condition::specific_product("a").with_param("min_quantity", "3"), &cart()));
        assert!(!registry.evaluate(&Condition::specific_product("missing"), &cart()));
    }

    #[test]
    fn product_count_counts_distinct_products() {
        let registry = ConditionRegistry::builtin();

        assert!(registry.evaluate(&Condition::product_count(2), &cart()));
        assert!(!registry.evaluate(&Condition::product_count(3), &cart()));
    }

    #[test]
    fn empty_cart_evaluates_against_zero() {
        let registry = ConditionRegistry::builtin();
        let empty = CartView::from_lines(Vec::new());

        assert!(registry.evaluate(&Condition::cart_total(Decimal::ZERO), &empty));
        assert!(registry.evaluate(&Condition::item_count(0), &empty));
        assert!(!registry.evaluate(&Condition::item_count(1), &empty));
    }

    #[test]
    fn unknown_kinds_never_match_until_registered() {
        let mut registry = ConditionRegistry::builtin();
        let weekday = Condition::new("weekday", RuleValue::Text("friday".to_string()));

        assert!(!registry.evaluate(&weekday, &cart()));

        registry.register("weekday", |condition: &Condition, _cart: &CartView| {
            condition.value.as_text() == "friday"
        });

        assert!(registry.evaluate(&weekday, &cart()));
    }
}
