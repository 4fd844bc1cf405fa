use chrono::{DateTime, Months, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long log entries are retained, in calendar months.
/// Entries older than this silently drop out of history — and therefore
/// out of profit statistics — on the next load or append.
pub const RETENTION_MONTHS: u32 = 6;

/// The five kinds of operation recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// Initial capital was adjusted
    CapitalAdjusted,
    /// A new position was opened
    Bought,
    /// An existing position was added to
    ToppedUp,
    /// Shares were sold (partially or fully)
    Sold,
    /// A purchase record was hidden from the lot view
    RecordDeleted,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::CapitalAdjusted => write!(f, "CapitalAdjusted"),
            OperationKind::Bought => write!(f, "Bought"),
            OperationKind::ToppedUp => write!(f, "ToppedUp"),
            OperationKind::Sold => write!(f, "Sold"),
            OperationKind::RecordDeleted => write!(f, "RecordDeleted"),
        }
    }
}

/// Structured payload of a log entry, specific to the operation kind.
///
/// Quantity, price, total, and profit are kept as numeric fields so derived
/// views (purchase records, profit statistics) never have to re-parse them
/// out of display text. The formatted description is cosmetic only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogPayload {
    CapitalAdjusted {
        old_capital: f64,
        new_capital: f64,
    },
    Bought {
        holding_id: Uuid,
        symbol: String,
        name: String,
        quantity: f64,
        unit_price: f64,
        total: f64,
    },
    ToppedUp {
        holding_id: Uuid,
        symbol: String,
        name: String,
        quantity: f64,
        unit_price: f64,
        total: f64,
    },
    Sold {
        holding_id: Uuid,
        symbol: String,
        name: String,
        quantity: f64,
        unit_price: f64,
        /// Proceeds of the sale (quantity × unit_price)
        total: f64,
        /// Realized profit attributed to this sale
        profit: f64,
    },
    RecordDeleted {
        holding_id: Uuid,
        symbol: String,
        /// Id of the hidden Bought/ToppedUp entry
        record_id: i64,
    },
}

impl LogPayload {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            LogPayload::CapitalAdjusted { .. } => OperationKind::CapitalAdjusted,
            LogPayload::Bought { .. } => OperationKind::Bought,
            LogPayload::ToppedUp { .. } => OperationKind::ToppedUp,
            LogPayload::Sold { .. } => OperationKind::Sold,
            LogPayload::RecordDeleted { .. } => OperationKind::RecordDeleted,
        }
    }

    /// Symbol this entry refers to, if any (capital adjustments have none).
    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        match self {
            LogPayload::CapitalAdjusted { .. } => None,
            LogPayload::Bought { symbol, .. }
            | LogPayload::ToppedUp { symbol, .. }
            | LogPayload::Sold { symbol, .. }
            | LogPayload::RecordDeleted { symbol, .. } => Some(symbol),
        }
    }

    /// Display name, if the entry carries one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            LogPayload::Bought { name, .. }
            | LogPayload::ToppedUp { name, .. }
            | LogPayload::Sold { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Realized profit, present on Sold entries only.
    #[must_use]
    pub fn profit(&self) -> Option<f64> {
        match self {
            LogPayload::Sold { profit, .. } => Some(*profit),
            _ => None,
        }
    }

    /// Render the human-readable description for this payload.
    /// Write-only: nothing in the library parses this text back.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            LogPayload::CapitalAdjusted {
                old_capital,
                new_capital,
            } => format!("Capital adjusted from ${old_capital:.2} to ${new_capital:.2}"),
            LogPayload::Bought {
                symbol,
                name,
                quantity,
                unit_price,
                total,
                ..
            } => format!(
                "Bought {name} ({symbol}): {quantity} shares at ${unit_price:.2}, total ${total:.2}"
            ),
            LogPayload::ToppedUp {
                symbol,
                name,
                quantity,
                unit_price,
                total,
                ..
            } => format!(
                "Topped up {name} ({symbol}): {quantity} shares at ${unit_price:.2}, total ${total:.2}"
            ),
            LogPayload::Sold {
                symbol,
                name,
                quantity,
                unit_price,
                total,
                ..
            } => format!(
                "Sold {name} ({symbol}): {quantity} shares at ${unit_price:.2}, proceeds ${total:.2}"
            ),
            LogPayload::RecordDeleted {
                symbol, record_id, ..
            } => format!("Deleted purchase record #{record_id} for {symbol}"),
        }
    }
}

/// A single immutable entry in the operation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Time-derived unique id (wall-clock milliseconds, bumped past the
    /// newest existing id so ids never collide)
    pub id: i64,

    /// Structured operation data
    pub payload: LogPayload,

    /// Wall-clock time of the action — drives display and retention
    pub timestamp: DateTime<Utc>,

    /// Cosmetic display text rendered from the payload at append time
    pub description: String,
}

impl LogEntry {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.payload.kind()
    }
}

/// Append-only operation history, newest-first, with a rolling
/// 6-month retention window.
///
/// Pruning runs on load and on every append, nowhere else. Every read
/// in between sees the same already-pruned state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationLog {
    /// Entries ordered newest-first (display order)
    pub entries: Vec<LogEntry>,
}

impl OperationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the head and prune anything that has fallen out
    /// of the retention window. Returns the new entry's id.
    pub fn append(&mut self, payload: LogPayload, now: DateTime<Utc>) -> i64 {
        let id = self.next_id(now);
        let description = payload.describe();
        self.entries.insert(
            0,
            LogEntry {
                id,
                payload,
                timestamp: now,
                description,
            },
        );
        self.prune_expired(now);
        id
    }

    /// Drop entries older than the retention cutoff (6 calendar months
    /// before `now`). Returns how many entries were removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let cutoff = retention_cutoff(now);
        let before = self.entries.len();
        self.entries.retain(|e| e.timestamp >= cutoff);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!("Pruned {removed} log entries older than {cutoff}");
        }
        removed
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&LogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.entries.iter()
    }

    /// Next entry id: wall-clock milliseconds, bumped past the newest
    /// existing id. Entries are newest-first, so the head holds the max.
    fn next_id(&self, now: DateTime<Utc>) -> i64 {
        let millis = now.timestamp_millis();
        match self.entries.first() {
            Some(newest) => millis.max(newest.id + 1),
            None => millis,
        }
    }
}

/// The oldest timestamp still retained as of `now`.
#[must_use]
pub fn retention_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(RETENTION_MONTHS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
