use chrono::Utc;
use log::debug;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::log::LogPayload;
use crate::models::portfolio::Portfolio;

/// Applies the four mutating ledger operations: buy, top-up, sell, and
/// capital adjustment.
///
/// Pure business logic — no I/O. Every successful mutation appends exactly
/// one operation-log entry; a rejected operation leaves the portfolio
/// completely untouched.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Open a new position.
    ///
    /// The new holding's cost basis is the purchase price. A symbol that
    /// already exists in the ledger gets a second, independent holding —
    /// positions are identified by id, not symbol.
    pub fn buy(
        &self,
        portfolio: &mut Portfolio,
        symbol: &str,
        name: Option<String>,
        quantity: f64,
        unit_price: f64,
    ) -> Result<Uuid, CoreError> {
        if symbol.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "Stock symbol must not be empty".into(),
            ));
        }
        Self::validate_amounts(quantity, unit_price)?;

        let total = quantity * unit_price;
        let remaining = portfolio.remaining_capital();
        if total > remaining {
            return Err(CoreError::InsufficientCapital {
                required: total,
                available: remaining,
            });
        }

        let holding = Holding::new(symbol, name, quantity, unit_price);
        let id = holding.id;
        debug!(
            "Buy {}: {} shares at {}, total {}",
            holding.symbol, quantity, unit_price, total
        );
        let payload = LogPayload::Bought {
            holding_id: id,
            symbol: holding.symbol.clone(),
            name: holding.name.clone(),
            quantity,
            unit_price,
            total,
        };
        portfolio.holdings.push(holding);
        portfolio.log.append(payload, Utc::now());
        Ok(id)
    }

    /// Add shares to an existing position.
    ///
    /// The surviving cost basis is the weighted average
    /// `(old_qty × old_basis + qty × price) / (old_qty + qty)`, kept at
    /// full precision — rounding happens at display time only.
    pub fn top_up(
        &self,
        portfolio: &mut Portfolio,
        holding_id: Uuid,
        quantity: f64,
        unit_price: f64,
    ) -> Result<(), CoreError> {
        Self::validate_amounts(quantity, unit_price)?;

        let total = quantity * unit_price;
        let remaining = portfolio.remaining_capital();
        if total > remaining {
            return Err(CoreError::InsufficientCapital {
                required: total,
                available: remaining,
            });
        }

        let holding = portfolio
            .holding_mut(holding_id)
            .ok_or_else(|| CoreError::HoldingNotFound(holding_id.to_string()))?;
        let new_quantity = holding.quantity + quantity;
        holding.cost_basis = (holding.quantity * holding.cost_basis + total) / new_quantity;
        holding.quantity = new_quantity;
        debug!(
            "Top up {}: {} shares at {}, new basis {}",
            holding.symbol, quantity, unit_price, holding.cost_basis
        );

        let payload = LogPayload::ToppedUp {
            holding_id,
            symbol: holding.symbol.clone(),
            name: holding.name.clone(),
            quantity,
            unit_price,
            total,
        };
        portfolio.log.append(payload, Utc::now());
        Ok(())
    }

    /// Plain ledger-level sell.
    ///
    /// Realized profit is `quantity × (sell_price − cost_basis)`. A full
    /// sell removes the holding; a partial sell reduces quantity only and
    /// leaves the cost basis untouched. Returns the realized profit.
    pub fn sell(
        &self,
        portfolio: &mut Portfolio,
        holding_id: Uuid,
        quantity: f64,
        sell_price: f64,
    ) -> Result<f64, CoreError> {
        self.apply_sale(portfolio, holding_id, quantity, sell_price, None)
    }

    /// Replace the declared starting capital. Holdings are untouched; the
    /// old and new values are recorded in the log.
    pub fn adjust_capital(
        &self,
        portfolio: &mut Portfolio,
        new_capital: f64,
    ) -> Result<(), CoreError> {
        if new_capital < 0.0 {
            return Err(CoreError::ValidationError(
                "Initial capital must not be negative".into(),
            ));
        }
        let old_capital = portfolio.initial_capital;
        portfolio.initial_capital = new_capital;
        portfolio.log.append(
            LogPayload::CapitalAdjusted {
                old_capital,
                new_capital,
            },
            Utc::now(),
        );
        Ok(())
    }

    /// Shared sale path for plain and lot-level sells.
    ///
    /// `cost_basis_override` is `Some` only when selling through a
    /// reconstructed purchase record: profit is computed against the lot's
    /// own price, and a surviving position is rebased to
    /// `(old_qty × old_basis − qty × override) / (old_qty − qty)`.
    pub(crate) fn apply_sale(
        &self,
        portfolio: &mut Portfolio,
        holding_id: Uuid,
        quantity: f64,
        sell_price: f64,
        cost_basis_override: Option<f64>,
    ) -> Result<f64, CoreError> {
        if sell_price <= 0.0 {
            return Err(CoreError::InvalidQuantity(
                "Sell price must be positive".into(),
            ));
        }
        if quantity <= 0.0 {
            return Err(CoreError::InvalidQuantity(
                "Sell quantity must be positive".into(),
            ));
        }

        let holding = portfolio
            .holding_mut(holding_id)
            .ok_or_else(|| CoreError::HoldingNotFound(holding_id.to_string()))?;
        if quantity > holding.quantity {
            return Err(CoreError::InvalidQuantity(format!(
                "Cannot sell {} shares of {} — only {} held",
                quantity, holding.symbol, holding.quantity
            )));
        }

        let symbol = holding.symbol.clone();
        let name = holding.name.clone();
        let old_quantity = holding.quantity;
        let old_basis = holding.cost_basis;

        let proceeds = quantity * sell_price;
        let basis_used = cost_basis_override.unwrap_or(old_basis);
        let profit = proceeds - quantity * basis_used;

        let remaining_quantity = old_quantity - quantity;
        if remaining_quantity <= f64::EPSILON {
            // Full sell: the position leaves the ledger entirely
            portfolio.holdings.retain(|h| h.id != holding_id);
        } else {
            holding.quantity = remaining_quantity;
            if let Some(override_basis) = cost_basis_override {
                holding.cost_basis =
                    (old_quantity * old_basis - quantity * override_basis) / remaining_quantity;
            }
        }

        portfolio.total_profit += profit;
        debug!("Sell {symbol}: {quantity} shares at {sell_price}, profit {profit}");
        portfolio.log.append(
            LogPayload::Sold {
                holding_id,
                symbol,
                name,
                quantity,
                unit_price: sell_price,
                total: proceeds,
                profit,
            },
            Utc::now(),
        );
        Ok(profit)
    }

    fn validate_amounts(quantity: f64, unit_price: f64) -> Result<(), CoreError> {
        if quantity <= 0.0 {
            return Err(CoreError::InvalidQuantity(
                "Quantity must be positive".into(),
            ));
        }
        if unit_price <= 0.0 {
            return Err(CoreError::InvalidQuantity(
                "Unit price must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
