use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single stock position currently held in the ledger.
///
/// `cost_basis` is the blended weighted-average cost per share — there are
/// no discrete tax lots. A holding whose quantity reaches zero is removed
/// from the ledger, never kept around with `quantity == 0`.
///
/// **Symbols are not unique** across holdings: a symbol that is fully sold
/// and later rebought becomes a new, distinct holding with a fresh id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Unique identifier, assigned at creation, stable for the life of the position
    pub id: Uuid,

    /// Ticker symbol, uppercased (e.g., "AAPL")
    pub symbol: String,

    /// Human-readable display name — defaults to the symbol
    pub name: String,

    /// Number of shares held (always positive while in the ledger)
    pub quantity: f64,

    /// Weighted-average cost per share
    pub cost_basis: f64,
}

impl Holding {
    /// Create a new position. A blank or missing name falls back to the symbol.
    pub fn new(
        symbol: impl Into<String>,
        name: Option<String>,
        quantity: f64,
        cost_basis: f64,
    ) -> Self {
        let symbol = symbol.into().trim().to_uppercase();
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| symbol.clone());
        Self {
            id: Uuid::new_v4(),
            symbol,
            name,
            quantity,
            cost_basis,
        }
    }

    /// Total capital committed to this position (quantity × cost basis).
    #[must_use]
    pub fn total_cost(&self) -> f64 {
        self.quantity * self.cost_basis
    }
}
