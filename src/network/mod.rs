//! HTTP networking module
//!
//! Provides HTTP client functionality for making requests to search APIs.

mod client;

pub use client::HttpClient;
