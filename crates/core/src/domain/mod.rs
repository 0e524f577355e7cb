pub mod cart;
pub mod discount;
pub mod rule;
