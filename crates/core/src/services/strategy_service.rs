use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::strategy::{
    StrategyParams, StrategyRow, MAX_STRATEGY_GROUPS, MAX_STRATEGY_PERCENT, MIN_STRATEGY_GROUPS,
    MIN_STRATEGY_PERCENT,
};

/// Computes the laddered buy/sell price grid from current holdings.
///
/// Pure calculation — reads holdings, mutates nothing, persists nothing.
pub struct StrategyService;

impl StrategyService {
    pub fn new() -> Self {
        Self
    }

    /// Compute the grid for every holding passing the symbol filter.
    ///
    /// For rung `i` in `1..=groups`:
    /// `buy_price = cost_basis × (1 − buy%/100)^i` and
    /// `sell_price = cost_basis × (1 + sell%/100)^i`. Buy prices fall and
    /// sell prices rise monotonically with `i`; values are returned as
    /// computed, with no clamping.
    pub fn compute(
        &self,
        holdings: &[Holding],
        params: &StrategyParams,
    ) -> Result<Vec<StrategyRow>, CoreError> {
        Self::validate_params(params)?;

        let filter = params
            .symbol_filter
            .as_deref()
            .map(|s| s.trim().to_uppercase());
        let buy_factor = 1.0 - params.buy_percent / 100.0;
        let sell_factor = 1.0 + params.sell_percent / 100.0;

        let mut rows = Vec::new();
        for holding in holdings {
            if let Some(symbol) = &filter {
                if holding.symbol != *symbol {
                    continue;
                }
            }
            for group in 1..=params.groups {
                rows.push(StrategyRow {
                    holding_id: holding.id,
                    symbol: holding.symbol.clone(),
                    name: holding.name.clone(),
                    group,
                    buy_price: holding.cost_basis * buy_factor.powi(group as i32),
                    sell_price: holding.cost_basis * sell_factor.powi(group as i32),
                    cost_basis: holding.cost_basis,
                });
            }
        }
        Ok(rows)
    }

    /// Range-check the grid parameters: percents in 1–50, groups in 1–10.
    pub fn validate_params(params: &StrategyParams) -> Result<(), CoreError> {
        if !(MIN_STRATEGY_PERCENT..=MAX_STRATEGY_PERCENT).contains(&params.buy_percent) {
            return Err(CoreError::ValidationError(format!(
                "Buy percent {} out of range ({MIN_STRATEGY_PERCENT}-{MAX_STRATEGY_PERCENT})",
                params.buy_percent
            )));
        }
        if !(MIN_STRATEGY_PERCENT..=MAX_STRATEGY_PERCENT).contains(&params.sell_percent) {
            return Err(CoreError::ValidationError(format!(
                "Sell percent {} out of range ({MIN_STRATEGY_PERCENT}-{MAX_STRATEGY_PERCENT})",
                params.sell_percent
            )));
        }
        if !(MIN_STRATEGY_GROUPS..=MAX_STRATEGY_GROUPS).contains(&params.groups) {
            return Err(CoreError::ValidationError(format!(
                "Group count {} out of range ({MIN_STRATEGY_GROUPS}-{MAX_STRATEGY_GROUPS})",
                params.groups
            )));
        }
        Ok(())
    }
}

impl Default for StrategyService {
    fn default() -> Self {
        Self::new()
    }
}
