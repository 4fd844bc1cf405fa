use serde::{Deserialize, Serialize};

/// User-configurable defaults, stored inside the encrypted portfolio file.
///
/// These seed the strategy-grid form; each computation can still override
/// them per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Default buy ladder step, percent per group
    pub default_buy_percent: f64,

    /// Default sell ladder step, percent per group
    pub default_sell_percent: f64,

    /// Default number of ladder groups
    pub default_groups: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_buy_percent: 5.0,
            default_sell_percent: 5.0,
            default_groups: 3,
        }
    }
}
