//! Refreshing the cached address.
//!
//! This module provides:
//! - The refresh policy itself ([`RefreshController`])
//! - A work queue that carries background and forced refreshes to a
//!   single worker ([`RefreshQueue`], [`RefreshWorker`], [`refresh_queue`])

mod controller;
mod queue;

#[cfg(test)]
mod controller_tests;

pub use controller::RefreshController;
pub use queue::{RefreshCommand, RefreshQueue, RefreshWorker, refresh_queue};
