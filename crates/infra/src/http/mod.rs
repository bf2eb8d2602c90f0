//! HTTP transport shared by the remote clients

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, RetryPolicy};
