pub mod catalog;
pub mod enrichment;
pub mod lyrics;

pub use crate::domain::model::{EnrichmentResult, Song};
pub use crate::domain::ports::{ConfigProvider, SongStore};
pub use crate::utils::error::Result;
