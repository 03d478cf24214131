//! Outbound HTTP: the [`HttpClient`] seam and the scraping-service client.

mod basic;
mod client;
pub(crate) mod remote;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use remote::{ANALYZE_URL_PATH, GET_CSV_PATH, ScrapingService};
