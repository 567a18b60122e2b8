pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use adapters::http::{GeniusClient, MusixmatchClient};
pub use adapters::storage::SqliteSongStore;
pub use config::CatalogConfig;
pub use core::{catalog::SongCatalog, enrichment::EnrichmentCoordinator};
pub use utils::error::{CatalogError, Result};
