//! dynaddr: dynamic server address resolution
//!
//! A library for deciding which backend server address a client should use.
//! A static default can be overridden by a remote lookup whose result is
//! cached with a time-to-live; expired entries keep being served while a
//! background refresh runs, and a manual refresh forces a new lookup.

pub mod cache;
pub mod config;
pub mod context;
pub mod fetcher;
pub mod notice;
pub mod refresh;
pub mod resolver;
pub mod store;
pub mod time;
pub mod transport;
