// src/ingest/mod.rs
pub mod category;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod prober;
pub mod shape;
pub mod types;

pub use error::ProbeError;
pub use prober::{ProbeSettings, SourceProber};
pub use types::{FetchOutcome, Popularity, Record, SourceDescriptor};
