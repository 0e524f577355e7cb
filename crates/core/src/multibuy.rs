//! Standing multibuy promotion: every complete group of `min_items` units
//! in the cart makes one cheapest unit free. This predates the rule engine
//! and runs independently of it; hosts that have moved fully to rules simply
//! never call it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::cart::CartView;

fn default_min_items() -> u32 {
    4
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultibuyConfig {
    /// Units required per free item.
    #[serde(default = "default_min_items")]
    pub min_items: u32,
    /// Optional floor applied when the cart holds exactly one complete
    /// group: if the cheapest unit is priced below the floor, the
    /// second-cheapest unit is the one made free instead.
    #[serde(default)]
    pub cheapest_price_floor: Option<Decimal>,
}

impl Default for MultibuyConfig {
    fn default() -> Self {
        Self { min_items: default_min_items(), cheapest_price_floor: None }
    }
}

/// Total discount for the multibuy promotion: the number of complete groups
/// in the cart, paid out as the that-many cheapest units. Carts below one
/// full group, or without any priced units, earn nothing.
pub fn multibuy_discount(cart: &CartView, config: &MultibuyConfig) -> Decimal {
    if config.min_items == 0 || cart.item_count < config.min_items {
        return Decimal::ZERO;
    }

    let prices = cart.unit_prices_ascending();
    if prices.is_empty() {
        return Decimal::ZERO;
    }

    let groups = (cart.item_count / config.min_items) as usize;

    if groups == 1 {
        if let Some(floor) = config.cheapest_price_floor {
            if prices[0] < floor {
                return prices.get(1).copied().unwrap_or(Decimal::ZERO);
            }
            return prices[0];
        }
    }

    prices.iter().take(groups).copied().sum()
}
