pub mod ledger_service;
pub mod record_service;
pub mod stats_service;
pub mod strategy_service;
