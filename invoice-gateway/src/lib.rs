pub mod config;
pub mod error;
pub mod handlers;
pub mod mapping;
pub mod models;
pub mod services;
pub mod startup;

use config::Config;
use services::ledger::LedgerClient;

/// Shared application state. Read-only after startup; no request holds a
/// lock or any cross-request resource.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub ledger: LedgerClient,
}
