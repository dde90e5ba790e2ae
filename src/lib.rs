pub mod client;
pub mod discovery;
pub mod error;
pub mod export;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod pager;

pub use client::{Auth, JiraClient, JiraConfig};
pub use error::Error;
pub use models::*;

// Pager re-exports
pub use pager::{FetchResult, fetch_all};

// Normalizer re-export
pub use normalize::Normalizer;

// Discovery re-exports
pub use discovery::{BoardResolution, format_candidates, resolve_board, resolve_estimate};

// Extractor re-exports
pub use extract::{ExtractOptions, Extractor};

// Exporter re-export
pub use export::DatasetExporter;
