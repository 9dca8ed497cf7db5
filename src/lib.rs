pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, OutputFormat};

pub use adapters::WorldBankClient;
pub use config::AtlasConfig;
pub use crate::core::{
    aggregation::aggregate,
    cache::SessionCache,
    catalog::IndicatorCatalog,
    country_reference::CountryReference,
    refresh::{RefreshEngine, RefreshOutcome},
    render::MapFrame,
    session::Session,
};
pub use utils::error::{AtlasError, Result};
