use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::cart::CartView;
use crate::domain::rule::{action_kind, Action};

/// Candidate outcome of one action against one cart: a non-negative amount
/// and/or a free-shipping grant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub amount: Decimal,
    pub free_shipping: bool,
}

impl ActionOutcome {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn amount(amount: Decimal) -> Self {
        Self { amount, free_shipping: false }
    }

    pub fn free_shipping() -> Self {
        Self { amount: Decimal::ZERO, free_shipping: true }
    }
}

/// Strategy computing the monetary value of one action. Implementations
/// must be pure and must degrade to `ActionOutcome::none()` for
/// configurations they cannot price.
pub trait ActionHandler: Send + Sync {
    fn compute(&self, action: &Action, cart: &CartView) -> ActionOutcome;
}

impl<F> ActionHandler for F
where
    F: Fn(&Action, &CartView) -> ActionOutcome + Send + Sync,
{
    fn compute(&self, action: &Action, cart: &CartView) -> ActionOutcome {
        self(action, cart)
    }
}

/// Open registry of action types, mirroring `ConditionRegistry`: built-ins
/// pre-registered, extension types added by callers, unknown kinds worth
/// nothing.
#[derive(Clone)]
pub struct ActionRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn empty() -> Self {
        Self { handlers: HashMap::new() }
    }

    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(action_kind::PERCENTAGE_DISCOUNT, percentage_discount);
        registry.register(action_kind::FIXED_DISCOUNT, fixed_discount);
        registry.register(action_kind::FREE_SHIPPING, free_shipping);
        registry.register(action_kind::CHEAPEST_FREE, cheapest_free);
        registry.register(action_kind::MOST_EXPENSIVE_FREE, most_expensive_free);
        registry.register(action_kind::NTH_CHEAPEST_FREE, nth_cheapest_free);
        registry.register(action_kind::NTH_EXPENSIVE_FREE, nth_expensive_free);
        registry
    }

    pub fn register(&mut self, kind: impl Into<String>, handler: impl ActionHandler + 'static) {
        self.handlers.insert(kind.into(), Arc::new(handler));
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn compute(&self, action: &Action, cart: &CartView) -> ActionOutcome {
        match self.handlers.get(&action.kind) {
            Some(handler) => handler.compute(action, cart),
            None => ActionOutcome::none(),
        }
    }
}

fn percentage_discount(action: &Action, cart: &CartView) -> ActionOutcome {
    // Out-of-range percentages are clamped, not rejected.
    let percent = action.value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    ActionOutcome::amount(cart.subtotal * percent / Decimal::ONE_HUNDRED)
}

fn fixed_discount(action: &Action, cart: &CartView) -> ActionOutcome {
    // A discount can never exceed the subtotal it discounts, and never go
    // below zero.
    ActionOutcome::amount(action.value.min(cart.subtotal).max(Decimal::ZERO))
}

fn free_shipping(_action: &Action, _cart: &CartView) -> ActionOutcome {
    ActionOutcome::free_shipping()
}

fn cheapest_free(_action: &Action, cart: &CartView) -> ActionOutcome {
    match cart.unit_prices_ascending().first() {
        Some(price) => ActionOutcome::amount(*price),
        None => ActionOutcome::none(),
    }
}

fn most_expensive_free(_action: &Action, cart: &CartView) -> ActionOutcome {
    match cart.unit_prices_ascending().last() {
        Some(price) => ActionOutcome::amount(*price),
        None => ActionOutcome::none(),
    }
}

fn nth_cheapest_free(action: &Action, cart: &CartView) -> ActionOutcome {
    nth_unit_price(cart.unit_prices_ascending(), action.position_param())
}

fn nth_expensive_free(action: &Action, cart: &CartView) -> ActionOutcome {
    let mut prices = cart.unit_prices_ascending();
    prices.reverse();
    nth_unit_price(prices, action.position_param())
}

/// Price of the unit at the 1-based `position`, or nothing when fewer than
/// `position` priced units exist.
fn nth_unit_price(prices: Vec<Decimal>, position: i64) -> ActionOutcome {
    if position < 1 {
        return ActionOutcome::none();
    }
    match prices.get(position as usize - 1) {
        Some(price) => ActionOutcome::amount(*price),
        None => ActionOutcome::none(),
    }
}
