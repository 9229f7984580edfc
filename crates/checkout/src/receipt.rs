use catalog::Money;
use chrono::{DateTime, Utc};
use common::{ProductId, UserId};
use serde::Serialize;

/// Message shown after a successful checkout.
pub const CONFIRMATION: &str = "Your order has been placed successfully!";

/// One purchased line, priced at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Summary of a completed checkout. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub user_id: UserId,
    pub lines: Vec<ReceiptLine>,
    pub total_items: u64,
    pub total_price: Money,
    pub placed_at: DateTime<Utc>,
}
