pub mod aggregation;
pub mod cache;
pub mod catalog;
pub mod country_reference;
pub mod fetcher;
pub mod merger;
pub mod pipeline;
pub mod refresh;
pub mod render;
pub mod session;

pub use crate::domain::model::{CacheEntry, MergedDataset, RawObservation};
pub use crate::domain::ports::{ConfigProvider, DataSource, Pipeline};
pub use crate::utils::error::Result;
