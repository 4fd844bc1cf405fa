use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::holding::Holding;
use super::log::OperationLog;
use super::settings::Settings;
use super::stats::CapitalSnapshot;

/// Starting bankroll assigned to a brand-new portfolio.
pub const DEFAULT_INITIAL_CAPITAL: f64 = 20_000.0;

/// The main data container. Everything in here gets serialized,
/// encrypted, and saved to the portable .stkr file.
///
/// Contains: declared capital, current positions, the operation log,
/// lifetime realized profit, the soft-deleted record ids, and user settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    /// Capital the user declared as their starting bankroll
    pub initial_capital: f64,

    /// Current positions
    pub holdings: Vec<Holding>,

    /// Operation history (newest-first, 6-month retention)
    pub log: OperationLog,

    /// Cumulative realized profit over the account lifetime.
    /// Stored rather than derived: log retention pruning must not erode it.
    pub total_profit: f64,

    /// Log entry ids hidden from the purchase-record view (soft delete).
    /// The entries themselves stay in the log and in profit statistics.
    #[serde(default)]
    pub deleted_record_ids: HashSet<i64>,

    /// User settings (strategy-grid defaults)
    #[serde(default)]
    pub settings: Settings,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            holdings: Vec::new(),
            log: OperationLog::new(),
            total_profit: 0.0,
            deleted_record_ids: HashSet::new(),
            settings: Settings::default(),
        }
    }
}

impl Portfolio {
    /// Look up a holding by id.
    #[must_use]
    pub fn holding(&self, id: Uuid) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.id == id)
    }

    /// Look up a holding by id, mutably.
    pub fn holding_mut(&mut self, id: Uuid) -> Option<&mut Holding> {
        self.holdings.iter_mut().find(|h| h.id == id)
    }

    /// Capital currently tied up in positions: Σ quantity × cost_basis.
    #[must_use]
    pub fn used_capital(&self) -> f64 {
        self.holdings.iter().map(Holding::total_cost).sum()
    }

    /// Capital still available for purchases.
    #[must_use]
    pub fn remaining_capital(&self) -> f64 {
        self.initial_capital - self.used_capital()
    }

    /// Declared capital plus lifetime realized profit.
    #[must_use]
    pub fn total_assets(&self) -> f64 {
        self.initial_capital + self.total_profit
    }

    /// All capital figures in one derived view.
    #[must_use]
    pub fn capital_snapshot(&self) -> CapitalSnapshot {
        let used_capital = self.used_capital();
        CapitalSnapshot {
            initial_capital: self.initial_capital,
            used_capital,
            remaining_capital: self.initial_capital - used_capital,
            total_profit: self.total_profit,
            total_assets: self.total_assets(),
        }
    }
}
