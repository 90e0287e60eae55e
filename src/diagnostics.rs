//! Structured events emitted while the client talks to the service.
//!
//! The client never logs directly; it hands every event to a [`DiagnosticSink`].
//! [`LogSink`] (the default) forwards to the `log` facade.

// Use 3rd party
use log::{debug, warn};
use reqwest::Method;

// Use built-in library
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Request {
        method: Method,
        path: String,
        attempt: u32,
    },
    RateLimited {
        path: String,
        wait: Duration,
    },
    Retrying {
        path: String,
        attempt: u32,
        wait: Duration,
        reason: String,
    },
    PageFetched {
        path: String,
        offset: u32,
        received: usize,
    },
    PageFailed {
        path: String,
        offset: u32,
        reason: String,
    },
    ChunkCompleted {
        path: String,
        index: usize,
        size: usize,
    },
    ChunkFailed {
        path: String,
        index: usize,
        size: usize,
        reason: String,
    },
    FeaturesUnavailable,
    Cancelled {
        path: String,
    },
}

pub trait DiagnosticSink: Send + Sync {
    fn record(&self, event: &Event);
}

/// Writes events through `log`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, event: &Event) {
        match event {
            Event::Request { method, path, attempt } => {
                debug!("{} {} (attempt {})", method, path, attempt)
            }
            Event::RateLimited { path, wait } => {
                warn!("rate limited on {}, waiting {:?}", path, wait)
            }
            Event::Retrying { path, attempt, wait, reason } => warn!(
                "{} failed on attempt {}: {}; retrying in {:?}",
                path, attempt, reason, wait
            ),
            Event::PageFetched { path, offset, received } => {
                debug!("{} offset {}: {} items", path, offset, received)
            }
            Event::PageFailed { path, offset, reason } => {
                warn!("{} offset {} could not be fetched: {}", path, offset, reason)
            }
            Event::ChunkCompleted { path, index, size } => {
                debug!("{} chunk {} ({} items) done", path, index, size)
            }
            Event::ChunkFailed { path, index, size, reason } => warn!(
                "{} chunk {} ({} items) failed: {}",
                path, index, size, reason
            ),
            Event::FeaturesUnavailable => {
                warn!("audio features are not available for this application")
            }
            Event::Cancelled { path } => debug!("{} cancelled by caller", path),
        }
    }
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _event: &Event) {}
}
