use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest accepted ladder step, percent.
pub const MIN_STRATEGY_PERCENT: f64 = 1.0;
/// Highest accepted ladder step, percent.
pub const MAX_STRATEGY_PERCENT: f64 = 50.0;
/// Fewest ladder groups per holding.
pub const MIN_STRATEGY_GROUPS: u32 = 1;
/// Most ladder groups per holding.
pub const MAX_STRATEGY_GROUPS: u32 = 10;

/// Parameters for the laddered buy/sell price grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Buy ladder step, percent per group (1–50)
    pub buy_percent: f64,

    /// Sell ladder step, percent per group (1–50)
    pub sell_percent: f64,

    /// Number of ladder rungs to compute per holding (1–10)
    pub groups: u32,

    /// Restrict the grid to one symbol (case-insensitive); None = all holdings
    pub symbol_filter: Option<String>,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            buy_percent: 5.0,
            sell_percent: 5.0,
            groups: 3,
            symbol_filter: None,
        }
    }
}

/// One rung of the strategy ladder for a holding.
///
/// Prices compound from the cost basis: rung `i` buys at
/// `cost_basis × (1 − buy%/100)^i` and sells at
/// `cost_basis × (1 + sell%/100)^i`. No clamping is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRow {
    /// The holding this rung was computed for
    pub holding_id: Uuid,

    /// Ticker symbol
    pub symbol: String,

    /// Display name
    pub name: String,

    /// Rung number, 1-based
    pub group: u32,

    /// Laddered buy price at this rung
    pub buy_price: f64,

    /// Laddered sell price at this rung
    pub sell_price: f64,

    /// The cost basis the ladder compounds from
    pub cost_basis: f64,
}
