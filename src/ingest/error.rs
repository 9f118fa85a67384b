// src/ingest/error.rs

//! Per-source probe failures. Every variant is recoverable: the prober logs it
//! and moves on to the next source.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    /// Connect, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("unexpected HTTP status {0}")]
    BadStatus(reqwest::StatusCode),

    /// Body is not valid JSON
    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// Valid JSON, but no known shape matched
    #[error("unrecognized response shape")]
    ShapeUnrecognized,

    /// Item at this position of the resolved list is not a JSON object
    #[error("item #{0} is not an object")]
    MalformedItem(usize),

    /// Shape matched but nothing survived truncation
    #[error("no items after truncation")]
    EmptyResult,
}

impl ProbeError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::Transport(_) => "transport",
            ProbeError::BadStatus(_) => "bad_status",
            ProbeError::Decode(_) => "decode",
            ProbeError::ShapeUnrecognized => "shape_unrecognized",
            ProbeError::MalformedItem(_) => "malformed_item",
            ProbeError::EmptyResult => "empty_result",
        }
    }
}
