use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub unit_price: Decimal,
    pub quantity: u32,
}

/// Read-only cart snapshot the engine evaluates against. Producers adapt the
/// host cart into this shape and exclude bundled child lines before the view
/// reaches the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    pub subtotal: Decimal,
    pub item_count: u32,
    pub lines: Vec<CartLine>,
}

impl CartView {
    /// Build a view from line items, deriving subtotal and item count.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let subtotal =
            lines.iter().map(|line| line.unit_price * Decimal::from(line.quantity)).sum();
        let item_count = lines.iter().map(|line| line.quantity).sum();
        Self { subtotal, item_count, lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total quantity of one product across all lines.
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.lines
            .iter()
            .filter(|line| &line.product_id == product_id)
            .map(|line| line.quantity)
            .sum()
    }

    /// Number of distinct products present with quantity > 0.
    pub fn distinct_product_count(&self) -> usize {
        let mut seen: Vec<&ProductId> = Vec::new();
        for line in &self.lines {
            if line.quantity > 0 && !seen.contains(&&line.product_id) {
                seen.push(&line.product_id);
            }
        }
        seen.len()
    }

    /// One entry per unit of quantity for every positively priced line,
    /// sorted ascending. Zero- and negative-priced lines carry no unit
    /// entries, so "no priced units" shows up as an empty result.
    pub fn unit_prices_ascending(&self) -> Vec<Decimal> {
        let mut prices = Vec::new();
        for line in &self.lines {
            if line.unit_price > Decimal::ZERO {
                for _ in 0..line.quantity {
                    prices.push(line.unit_price);
                }
            }
        }
        prices.sort();
        prices
    }
}
