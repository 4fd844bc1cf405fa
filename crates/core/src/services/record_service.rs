use chrono::Utc;
use log::debug;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::log::{LogEntry, LogPayload};
use crate::models::portfolio::Portfolio;
use crate::models::record::PurchaseRecord;
use crate::services::ledger_service::LedgerService;

/// Reconstructs per-purchase "lots" for a holding out of the operation log,
/// and applies lot-level sell and soft-delete.
///
/// Lots are a derived view: nothing here is persisted beyond the log itself
/// and the set of soft-deleted entry ids.
pub struct RecordService {
    ledger_service: LedgerService,
}

impl RecordService {
    pub fn new() -> Self {
        Self {
            ledger_service: LedgerService::new(),
        }
    }

    /// Reconstruct the purchase lots for a holding.
    ///
    /// Scans the retained log for Bought/ToppedUp entries belonging to the
    /// holding, skipping soft-deleted ids. Lazy and restartable; yields
    /// newest-first, matching log order.
    pub fn purchase_records<'a>(
        &self,
        portfolio: &'a Portfolio,
        holding_id: Uuid,
    ) -> impl Iterator<Item = PurchaseRecord> + 'a {
        portfolio
            .log
            .iter()
            .filter(move |entry| !portfolio.deleted_record_ids.contains(&entry.id))
            .filter_map(move |entry| Self::to_record(entry, holding_id))
    }

    /// Hide a purchase record from the lot view.
    ///
    /// The underlying log entry is untouched and keeps counting toward
    /// profit statistics. The first effective hide appends a RecordDeleted
    /// entry and returns `true`; hiding an already-hidden record is a
    /// no-op returning `false`. Holding quantity and cost basis never change.
    pub fn delete_record(
        &self,
        portfolio: &mut Portfolio,
        record_id: i64,
    ) -> Result<bool, CoreError> {
        let (holding_id, symbol) = match portfolio.log.get(record_id).map(|e| &e.payload) {
            Some(
                LogPayload::Bought {
                    holding_id, symbol, ..
                }
                | LogPayload::ToppedUp {
                    holding_id, symbol, ..
                },
            ) => (*holding_id, symbol.clone()),
            _ => return Err(CoreError::RecordNotFound(record_id)),
        };

        if !portfolio.deleted_record_ids.insert(record_id) {
            return Ok(false);
        }
        debug!("Hide purchase record #{record_id} for {symbol}");
        portfolio.log.append(
            LogPayload::RecordDeleted {
                holding_id,
                symbol,
                record_id,
            },
            Utc::now(),
        );
        Ok(true)
    }

    /// Sell exactly one reconstructed lot at `sell_price`.
    ///
    /// Equivalent to a ledger sell of the lot's quantity with the lot's own
    /// purchase price as the cost basis, so profit is attributed against
    /// what this specific lot cost. The lot is consumed afterwards (its
    /// source entry id joins the deleted set); the Sold entry is the only
    /// log entry appended. Returns the realized profit.
    pub fn sell_record(
        &self,
        portfolio: &mut Portfolio,
        record_id: i64,
        sell_price: f64,
    ) -> Result<f64, CoreError> {
        let record = self
            .find_record(portfolio, record_id)
            .ok_or(CoreError::RecordNotFound(record_id))?;

        let profit = self.ledger_service.apply_sale(
            portfolio,
            record.holding_id,
            record.quantity,
            sell_price,
            Some(record.unit_price),
        )?;
        portfolio.deleted_record_ids.insert(record_id);
        Ok(profit)
    }

    /// Look up a single non-hidden purchase record by its source entry id.
    #[must_use]
    pub fn find_record(&self, portfolio: &Portfolio, record_id: i64) -> Option<PurchaseRecord> {
        if portfolio.deleted_record_ids.contains(&record_id) {
            return None;
        }
        let entry = portfolio.log.get(record_id)?;
        match &entry.payload {
            LogPayload::Bought { holding_id, .. } | LogPayload::ToppedUp { holding_id, .. } => {
                Self::to_record(entry, *holding_id)
            }
            _ => None,
        }
    }

    fn to_record(entry: &LogEntry, holding_id: Uuid) -> Option<PurchaseRecord> {
        match &entry.payload {
            LogPayload::Bought {
                holding_id: hid,
                symbol,
                quantity,
                unit_price,
                total,
                ..
            }
            | LogPayload::ToppedUp {
                holding_id: hid,
                symbol,
                quantity,
                unit_price,
                total,
                ..
            } if *hid == holding_id => Some(PurchaseRecord {
                record_id: entry.id,
                holding_id,
                symbol: symbol.clone(),
                quantity: *quantity,
                unit_price: *unit_price,
                total: *total,
                timestamp: entry.timestamp,
            }),
            _ => None,
        }
    }
}

impl Default for RecordService {
    fn default() -> Self {
        Self::new()
    }
}
