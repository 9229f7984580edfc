//! Quantity clamp policy shared by the add and update paths.
//!
//! Out-of-range requests are adjusted to the nearest valid value rather
//! than rejected:
//!
//! | path   | requested <= 0 | requested > inventory |
//! |--------|----------------|-----------------------|
//! | add    | treated as 1   | clamped to inventory  |
//! | update | line removed   | clamped to inventory  |

use crate::{CartError, Result};

/// A quantity after the clamp policy has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamped {
    pub quantity: u32,
    /// True if the quantity was lowered to fit inventory.
    pub adjusted: bool,
}

impl Clamped {
    fn within(quantity: u64, inventory: u32) -> Self {
        if quantity > u64::from(inventory) {
            Self {
                quantity: inventory,
                adjusted: true,
            }
        } else {
            Self {
                quantity: u32::try_from(quantity).unwrap_or(inventory),
                adjusted: false,
            }
        }
    }
}

/// Clamps a quantity requested on the add path.
pub fn clamp_request(requested: i64, inventory: u32) -> Clamped {
    let requested = u64::try_from(requested).unwrap_or(0).max(1);
    Clamped::within(requested, inventory)
}

/// Clamps the merged quantity when adding to an existing line.
pub fn clamp_merge(existing: u32, added: u32, inventory: u32) -> Clamped {
    Clamped::within(u64::from(existing) + u64::from(added), inventory)
}

/// What the update path should do with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Delete the line. `sold_out` is set when the request was positive but
    /// nothing is left in stock.
    Remove { sold_out: bool },
    /// Set the line to this quantity.
    Set(Clamped),
}

/// Applies the update-path policy to a requested quantity.
pub fn clamp_update(requested: i64, inventory: u32) -> QuantityChange {
    let Ok(requested) = u64::try_from(requested) else {
        return QuantityChange::Remove { sold_out: false };
    };
    if requested == 0 {
        return QuantityChange::Remove { sold_out: false };
    }
    if inventory == 0 {
        return QuantityChange::Remove { sold_out: true };
    }
    QuantityChange::Set(Clamped::within(requested, inventory))
}

/// Parses raw quantity input (form field, query string, JSON string).
///
/// Surrounding whitespace is ignored. Anything that is not an integer is an
/// `InvalidQuantity` error; range checks are left to the clamp policy.
pub fn parse_quantity(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CartError::InvalidQuantity(raw.to_string()))
}
