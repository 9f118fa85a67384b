// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod format;
pub mod ingest;
pub mod notify;
pub mod runner;
pub mod scheduler;
pub mod snapshot;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::format::{Card, DisplaySettings, Formatter};
pub use crate::ingest::{FetchOutcome, Popularity, ProbeSettings, Record, SourceDescriptor, SourceProber};
pub use crate::notify::{FeishuNotifier, Notifier};
pub use crate::runner::{run_guarded, run_once, RunReport};
