//! HTTP client for fetching remote artifacts.

mod client;

pub use client::HttpClient;
