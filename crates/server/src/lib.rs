//! Snapshot explorer HTTP service
//!
//! Serves one active cluster snapshot through counts, filtering,
//! component search and usage reports, alongside health and metrics.

pub mod api;
pub mod config;
pub mod state;

pub use api::create_router;
pub use config::ServerConfig;
pub use state::AppState;
