//! HTTP transport used by the address fetcher.
//!
//! This module provides:
//! - Request and response value types ([`HttpRequest`], [`HttpResponse`])
//! - The client abstraction the fetcher depends on ([`HttpClient`])
//! - The production implementation backed by reqwest ([`ReqwestClient`])

mod client;
mod error;
mod http;


pub use client::ReqwestClient;
pub use error::HttpError;
pub use http::{HttpClient, HttpRequest, HttpResponse};
