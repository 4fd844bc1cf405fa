pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use uuid::Uuid;

use errors::CoreError;
use models::{
    holding::Holding,
    log::{LogEntry, LogPayload, OperationKind},
    portfolio::Portfolio,
    record::PurchaseRecord,
    settings::Settings,
    stats::{CapitalSnapshot, MonthlyProfitStat, ProfitStat},
    strategy::{StrategyParams, StrategyRow},
};
use services::{
    ledger_service::LedgerService, record_service::RecordService, stats_service::StatsService,
    strategy_service::StrategyService,
};
use storage::manager::StorageManager;

/// Main entry point for the Stock Tracker core library.
/// Holds the portfolio state and all services needed to operate on it.
///
/// Mutations take `&mut self` and run to completion before the next call
/// is accepted. Single user, single session; no operation suspends
/// mid-mutation.
#[must_use]
pub struct StockTracker {
    portfolio: Portfolio,
    ledger_service: LedgerService,
    record_service: RecordService,
    stats_service: StatsService,
    strategy_service: StrategyService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for StockTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockTracker")
            .field("holdings", &self.portfolio.holdings.len())
            .field("log_entries", &self.portfolio.log.len())
            .field("total_profit", &self.portfolio.total_profit)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl StockTracker {
    /// Create a brand new empty portfolio with default settings and the
    /// default starting capital.
    pub fn create_new() -> Self {
        Self::build(Portfolio::default())
    }

    /// Load an existing portfolio from encrypted bytes (password required).
    /// Use this for WASM / Tauri where the frontend handles file I/O.
    /// Log entries past the retention window are pruned immediately.
    pub fn load_from_bytes(encrypted: &[u8], password: &str) -> Result<Self, CoreError> {
        let mut portfolio = StorageManager::load_from_bytes(encrypted, password)?;
        portfolio.log.prune_expired(chrono::Utc::now());
        Ok(Self::build(portfolio))
    }

    /// Save the current portfolio to encrypted bytes.
    /// Returns raw bytes that the frontend can write to a file.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self, password: &str) -> Result<Vec<u8>, CoreError> {
        let bytes = StorageManager::save_to_bytes(&self.portfolio, password)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load from an encrypted file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: &str, password: &str) -> Result<Self, CoreError> {
        let mut portfolio = StorageManager::load_from_file(path, password)?;
        portfolio.log.prune_expired(chrono::Utc::now());
        Ok(Self::build(portfolio))
    }

    /// Save to an encrypted file on disk (native only, not WASM).
    /// Clears the unsaved-changes flag on success.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&mut self, path: &str, password: &str) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.portfolio, path, password)?;
        self.dirty = false;
        Ok(())
    }

    // ── Capital ─────────────────────────────────────────────────────

    /// Replace the declared starting capital (≥ 0). Holdings are untouched;
    /// the adjustment is recorded in the operation log.
    pub fn set_initial_capital(&mut self, new_capital: f64) -> Result<(), CoreError> {
        self.ledger_service
            .adjust_capital(&mut self.portfolio, new_capital)?;
        self.dirty = true;
        Ok(())
    }

    /// All capital figures in one derived snapshot:
    /// initial / used / remaining / lifetime profit / total assets.
    #[must_use]
    pub fn capital(&self) -> CapitalSnapshot {
        self.portfolio.capital_snapshot()
    }

    #[must_use]
    pub fn initial_capital(&self) -> f64 {
        self.portfolio.initial_capital
    }

    /// Capital currently tied up in positions: Σ quantity × cost basis.
    #[must_use]
    pub fn used_capital(&self) -> f64 {
        self.portfolio.used_capital()
    }

    /// Capital still available for purchases.
    #[must_use]
    pub fn remaining_capital(&self) -> f64 {
        self.portfolio.remaining_capital()
    }

    /// Cumulative realized profit over the account lifetime.
    #[must_use]
    pub fn total_profit(&self) -> f64 {
        self.portfolio.total_profit
    }

    /// Declared capital plus lifetime realized profit.
    #[must_use]
    pub fn total_assets(&self) -> f64 {
        self.portfolio.total_assets()
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Open a new position. Returns the new holding's id.
    pub fn buy(
        &mut self,
        symbol: &str,
        name: Option<String>,
        quantity: f64,
        unit_price: f64,
    ) -> Result<Uuid, CoreError> {
        let id = self
            .ledger_service
            .buy(&mut self.portfolio, symbol, name, quantity, unit_price)?;
        self.dirty = true;
        Ok(id)
    }

    /// Add shares to an existing position at a given price; the cost basis
    /// becomes the weighted average of the old and new shares.
    pub fn top_up(
        &mut self,
        holding_id: Uuid,
        quantity: f64,
        unit_price: f64,
    ) -> Result<(), CoreError> {
        self.ledger_service
            .top_up(&mut self.portfolio, holding_id, quantity, unit_price)?;
        self.dirty = true;
        Ok(())
    }

    /// Sell shares from a position. A full sell removes the holding; a
    /// partial sell reduces quantity and keeps the cost basis. Returns the
    /// realized profit of this sale.
    pub fn sell(
        &mut self,
        holding_id: Uuid,
        quantity: f64,
        sell_price: f64,
    ) -> Result<f64, CoreError> {
        let profit = self
            .ledger_service
            .sell(&mut self.portfolio, holding_id, quantity, sell_price)?;
        self.dirty = true;
        Ok(profit)
    }

    /// Current positions, in insertion order.
    #[must_use]
    pub fn holdings(&self) -> &[Holding] {
        &self.portfolio.holdings
    }

    /// Get a single holding by its id.
    #[must_use]
    pub fn get_holding(&self, holding_id: Uuid) -> Option<&Holding> {
        self.portfolio.holding(holding_id)
    }

    /// All holdings for a symbol (case-insensitive). More than one entry
    /// means the symbol was rebought after a full sell.
    #[must_use]
    pub fn holdings_for_symbol(&self, symbol: &str) -> Vec<&Holding> {
        let upper = symbol.to_uppercase();
        self.portfolio
            .holdings
            .iter()
            .filter(|h| h.symbol == upper)
            .collect()
    }

    #[must_use]
    pub fn holding_count(&self) -> usize {
        self.portfolio.holdings.len()
    }

    // ── Purchase Records ────────────────────────────────────────────

    /// Reconstructed purchase lots for a holding, newest-first, with
    /// soft-deleted records hidden.
    #[must_use]
    pub fn purchase_records(&self, holding_id: Uuid) -> Vec<PurchaseRecord> {
        self.record_service
            .purchase_records(&self.portfolio, holding_id)
            .collect()
    }

    /// Look up one non-hidden purchase record by its log entry id.
    #[must_use]
    pub fn get_purchase_record(&self, record_id: i64) -> Option<PurchaseRecord> {
        self.record_service.find_record(&self.portfolio, record_id)
    }

    /// Hide a purchase record from the lot view. Idempotent — returns
    /// `true` only when the record was newly hidden. The underlying log
    /// entry and all profit statistics are unaffected.
    pub fn delete_purchase_record(&mut self, record_id: i64) -> Result<bool, CoreError> {
        let hidden = self
            .record_service
            .delete_record(&mut self.portfolio, record_id)?;
        if hidden {
            self.dirty = true;
        }
        Ok(hidden)
    }

    /// Sell one reconstructed lot at `sell_price`, using the lot's own
    /// purchase price as cost basis, and consume the lot. Returns the
    /// realized profit.
    pub fn sell_purchase_record(
        &mut self,
        record_id: i64,
        sell_price: f64,
    ) -> Result<f64, CoreError> {
        let profit = self
            .record_service
            .sell_record(&mut self.portfolio, record_id, sell_price)?;
        self.dirty = true;
        Ok(profit)
    }

    // ── Operation Log ───────────────────────────────────────────────

    /// Retained log entries, newest-first. Pagination is the caller's job.
    #[must_use]
    pub fn logs(&self) -> &[LogEntry] {
        &self.portfolio.log.entries
    }

    /// Get a single log entry by its id.
    #[must_use]
    pub fn get_log_entry(&self, id: i64) -> Option<&LogEntry> {
        self.portfolio.log.get(id)
    }

    /// The total number of retained log entries.
    #[must_use]
    pub fn log_count(&self) -> usize {
        self.portfolio.log.len()
    }

    /// Log entries touching a symbol (case-insensitive), newest-first.
    #[must_use]
    pub fn logs_for_symbol(&self, symbol: &str) -> Vec<&LogEntry> {
        let upper = symbol.to_uppercase();
        self.portfolio
            .log
            .iter()
            .filter(|e| e.payload.symbol() == Some(upper.as_str()))
            .collect()
    }

    /// Log entries of one operation kind, newest-first.
    #[must_use]
    pub fn logs_by_kind(&self, kind: OperationKind) -> Vec<&LogEntry> {
        self.portfolio
            .log
            .iter()
            .filter(|e| e.kind() == kind)
            .collect()
    }

    /// Search log entries by matching query against symbol, name, and
    /// description (case-insensitive), newest-first.
    #[must_use]
    pub fn search_logs(&self, query: &str) -> Vec<&LogEntry> {
        let q = query.to_lowercase();
        self.portfolio
            .log
            .iter()
            .filter(|e| {
                e.payload
                    .symbol()
                    .is_some_and(|s| s.to_lowercase().contains(&q))
                    || e.payload
                        .name()
                        .is_some_and(|n| n.to_lowercase().contains(&q))
                    || e.description.to_lowercase().contains(&q)
            })
            .collect()
    }

    // ── Profit Statistics ───────────────────────────────────────────

    /// Per-symbol cumulative realized profit over the retained log.
    #[must_use]
    pub fn profit_stats(&self) -> Vec<ProfitStat> {
        self.stats_service.profit_stats(&self.portfolio)
    }

    /// Per-symbol-per-month realized profit over the retained log.
    #[must_use]
    pub fn monthly_profit_stats(&self) -> Vec<MonthlyProfitStat> {
        self.stats_service.monthly_profit_stats(&self.portfolio)
    }

    // ── Strategy Grid ───────────────────────────────────────────────

    /// Compute the laddered buy/sell grid for current holdings.
    pub fn strategy_grid(&self, params: &StrategyParams) -> Result<Vec<StrategyRow>, CoreError> {
        self.strategy_service
            .compute(&self.portfolio.holdings, params)
    }

    /// Compute the grid with the saved default parameters over all holdings.
    pub fn default_strategy_grid(&self) -> Result<Vec<StrategyRow>, CoreError> {
        let settings = &self.portfolio.settings;
        let params = StrategyParams {
            buy_percent: settings.default_buy_percent,
            sell_percent: settings.default_sell_percent,
            groups: settings.default_groups,
            symbol_filter: None,
        };
        self.strategy_service
            .compute(&self.portfolio.holdings, &params)
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Get current settings.
    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.portfolio.settings
    }

    /// Persist new strategy-grid defaults. Range-checked like any grid
    /// computation (percents 1–50, groups 1–10).
    pub fn set_strategy_defaults(
        &mut self,
        buy_percent: f64,
        sell_percent: f64,
        groups: u32,
    ) -> Result<(), CoreError> {
        let params = StrategyParams {
            buy_percent,
            sell_percent,
            groups,
            symbol_filter: None,
        };
        StrategyService::validate_params(&params)?;
        self.portfolio.settings = Settings {
            default_buy_percent: buy_percent,
            default_sell_percent: sell_percent,
            default_groups: groups,
        };
        self.dirty = true;
        Ok(())
    }

    // ── Password & Dirty State ──────────────────────────────────────

    /// Re-encrypt the portfolio with a new password.
    /// Returns the encrypted bytes. The caller should write them to storage.
    ///
    /// `last_saved_bytes` must be the most recently saved encrypted bytes
    /// for this portfolio. The current password is verified by decrypting
    /// them; on mismatch this returns `CoreError::Decryption`.
    pub fn change_password(
        &mut self,
        last_saved_bytes: &[u8],
        current_password: &str,
        new_password: &str,
    ) -> Result<Vec<u8>, CoreError> {
        // Verify the current password against the actual saved data.
        StorageManager::load_from_bytes(last_saved_bytes, current_password)?;

        let new_bytes = StorageManager::save_to_bytes(&self.portfolio, new_password)?;
        self.dirty = false;
        Ok(new_bytes)
    }

    /// Returns `true` if the portfolio has been modified since the last
    /// save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Export the retained operation log as a JSON string.
    pub fn export_logs_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.portfolio.log.entries)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize log to JSON: {e}")))
    }

    /// Export the retained operation log as a CSV string.
    /// Columns: id, kind, symbol, name, quantity, unit_price, profit, timestamp, description
    #[must_use]
    pub fn export_logs_to_csv(&self) -> String {
        let mut csv =
            String::from("id,kind,symbol,name,quantity,unit_price,profit,timestamp,description\n");
        for entry in self.portfolio.log.iter() {
            let payload = &entry.payload;
            let quantity = match payload {
                LogPayload::Bought { quantity, .. }
                | LogPayload::ToppedUp { quantity, .. }
                | LogPayload::Sold { quantity, .. } => quantity.to_string(),
                _ => String::new(),
            };
            let unit_price = match payload {
                LogPayload::Bought { unit_price, .. }
                | LogPayload::ToppedUp { unit_price, .. }
                | LogPayload::Sold { unit_price, .. } => unit_price.to_string(),
                _ => String::new(),
            };
            let profit = payload.profit().map(|p| p.to_string()).unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{},{}\n",
                entry.id,
                entry.kind(),
                payload.symbol().unwrap_or(""),
                csv_escape(payload.name().unwrap_or("")),
                quantity,
                unit_price,
                profit,
                entry.timestamp.to_rfc3339(),
                csv_escape(&entry.description),
            ));
        }
        csv
    }

    /// Export the full portfolio as JSON (unencrypted snapshot for
    /// debugging/display).
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.portfolio)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(portfolio: Portfolio) -> Self {
        Self {
            portfolio,
            ledger_service: LedgerService::new(),
            record_service: RecordService::new(),
            stats_service: StatsService::new(),
            strategy_service: StrategyService::new(),
            dirty: false,
        }
    }
}

/// Quote a CSV field when it contains commas, quotes, or newlines.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
