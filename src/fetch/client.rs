use async_trait::async_trait;
use reqwest::{Request, Response};

/// Transport seam for outbound requests, so callers can wrap or replace the
/// underlying `reqwest` client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
