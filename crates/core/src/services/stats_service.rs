use std::collections::HashMap;

use crate::models::log::LogPayload;
use crate::models::portfolio::Portfolio;
use crate::models::stats::{MonthlyProfitStat, ProfitStat};

/// Reduces the operation log into realized-profit statistics.
///
/// Full recompute on every call — the log is small and bounded by the
/// 6-month retention window, so there is no incremental state to keep in
/// sync. Entries pruned from the log silently stop contributing.
pub struct StatsService;

impl StatsService {
    pub fn new() -> Self {
        Self
    }

    /// Cumulative realized profit per symbol over the retained Sold entries.
    /// Sorted by symbol for deterministic output.
    #[must_use]
    pub fn profit_stats(&self, portfolio: &Portfolio) -> Vec<ProfitStat> {
        let mut by_symbol: HashMap<&str, (f64, usize)> = HashMap::new();
        for entry in portfolio.log.iter() {
            if let LogPayload::Sold { symbol, profit, .. } = &entry.payload {
                let slot = by_symbol.entry(symbol.as_str()).or_insert((0.0, 0));
                slot.0 += profit;
                slot.1 += 1;
            }
        }

        let mut stats: Vec<ProfitStat> = by_symbol
            .into_iter()
            .map(|(symbol, (profit, sell_count))| ProfitStat {
                symbol: symbol.to_string(),
                profit,
                sell_count,
            })
            .collect();
        stats.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        stats
    }

    /// Realized profit per (symbol, calendar month) over the retained Sold
    /// entries. Month keys are "YYYY-MM". Sorted by symbol ascending, then
    /// month descending — newest month first, matching log display order.
    #[must_use]
    pub fn monthly_profit_stats(&self, portfolio: &Portfolio) -> Vec<MonthlyProfitStat> {
        let mut by_key: HashMap<(&str, String), f64> = HashMap::new();
        for entry in portfolio.log.iter() {
            if let LogPayload::Sold { symbol, profit, .. } = &entry.payload {
                let month = entry.timestamp.format("%Y-%m").to_string();
                *by_key.entry((symbol.as_str(), month)).or_insert(0.0) += profit;
            }
        }

        let mut stats: Vec<MonthlyProfitStat> = by_key
            .into_iter()
            .map(|((symbol, month), profit)| MonthlyProfitStat {
                symbol: symbol.to_string(),
                month,
                profit,
            })
            .collect();
        stats.sort_by(|a, b| {
            a.symbol
                .cmp(&b.symbol)
                .then_with(|| b.month.cmp(&a.month))
        });
        stats
    }
}

impl Default for StatsService {
    fn default() -> Self {
        Self::new()
    }
}
