use serde::{Deserialize, Serialize};

/// Cumulative realized profit for one symbol, summed over the Sold entries
/// currently retained in the operation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitStat {
    /// Ticker symbol
    pub symbol: String,

    /// Total realized profit across retained sales of this symbol
    pub profit: f64,

    /// Number of retained sales contributing to the total
    pub sell_count: usize,
}

/// Realized profit for one symbol in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProfitStat {
    /// Ticker symbol
    pub symbol: String,

    /// Calendar month key, "YYYY-MM"
    pub month: String,

    /// Realized profit for this symbol in this month
    pub profit: f64,
}

/// Point-in-time capital figures derived from the ledger.
///
/// The core recomputes this on demand — the frontend only renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalSnapshot {
    /// Capital the user declared as their starting bankroll
    pub initial_capital: f64,

    /// Σ quantity × cost_basis over all holdings
    pub used_capital: f64,

    /// initial_capital − used_capital
    pub remaining_capital: f64,

    /// Cumulative realized profit over the account lifetime
    pub total_profit: f64,

    /// initial_capital + total_profit
    pub total_assets: f64,
}
