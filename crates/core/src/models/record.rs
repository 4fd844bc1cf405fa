use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pseudo-lot reconstructed from one Bought/ToppedUp log entry.
///
/// Derived on demand from the operation log — never persisted. Records
/// whose source entry id sits in the portfolio's deleted-record set are
/// skipped during reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Id of the log entry this record was reconstructed from
    pub record_id: i64,

    /// The holding this purchase belongs to
    pub holding_id: Uuid,

    /// Ticker symbol at purchase time
    pub symbol: String,

    /// Shares bought in this lot
    pub quantity: f64,

    /// Price paid per share
    pub unit_price: f64,

    /// Capital spent on this lot (quantity × unit_price)
    pub total: f64,

    /// When the purchase happened
    pub timestamp: DateTime<Utc>,
}
