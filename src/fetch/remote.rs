//! Client for the SEO scraping service.
//!
//! The service is a black box that answers two `POST` endpoints with a CSV
//! attachment. Requests are never retried; every failure goes straight back
//! to the caller.

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Url};
use serde::Serialize;
use tracing::{debug, warn};

use super::client::HttpClient;
use crate::error::RemoteServiceError;

/// Keyword search: scrape the top results for a keyword.
pub const GET_CSV_PATH: &str = "get_csv";
/// Single-page analysis for a keyword and URL.
pub const ANALYZE_URL_PATH: &str = "analyze_url";

/// Longest slice of an error body kept in [`RemoteServiceError::Rejected`].
const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Serialize)]
struct KeywordRequest<'a> {
    keyword_to_search: &'a str,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    keyword_to_search: &'a str,
    url: &'a str,
}

pub struct ScrapingService<C> {
    client: C,
    base_url: Url,
}

impl<C: HttpClient> ScrapingService<C> {
    /// Creates a service client rooted at `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(client: C, base_url: &str) -> anyhow::Result<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Requests the CSV of analyzed search results for `keyword`.
    ///
    /// # Errors
    ///
    /// [`RemoteServiceError::InvalidRequest`] for a blank keyword (nothing is
    /// sent), otherwise `Unreachable` or `Rejected`.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_keyword_csv(&self, keyword: &str) -> Result<Bytes, RemoteServiceError> {
        let keyword = validate_keyword(keyword)?;
        self.post_json(
            GET_CSV_PATH,
            &KeywordRequest {
                keyword_to_search: keyword,
            },
        )
        .await
    }

    /// Requests the CSV analysis of a single `url` for `keyword`.
    ///
    /// # Errors
    ///
    /// [`RemoteServiceError::InvalidRequest`] for a blank keyword or a URL
    /// that is not absolute http(s), otherwise `Unreachable` or `Rejected`.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_url_analysis(
        &self,
        keyword: &str,
        url: &str,
    ) -> Result<Bytes, RemoteServiceError> {
        let keyword = validate_keyword(keyword)?;
        let target = validate_target_url(url)?;
        self.post_json(
            ANALYZE_URL_PATH,
            &AnalyzeRequest {
                keyword_to_search: keyword,
                url: target.as_str(),
            },
        )
        .await
    }

    async fn post_json(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<Bytes, RemoteServiceError> {
        let endpoint = self
            .base_url
            .join(path)
            .map_err(|e| RemoteServiceError::invalid(format!("bad endpoint `{path}`: {e}")))?;
        let payload = serde_json::to_vec(body)
            .map_err(|e| RemoteServiceError::invalid(format!("failed to encode request: {e}")))?;

        let mut req = Request::new(Method::POST, endpoint.clone());
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        req.headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("text/csv"));
        *req.body_mut() = Some(payload.into());

        let unreachable = |source: reqwest::Error| RemoteServiceError::Unreachable {
            endpoint: endpoint.to_string(),
            source,
        };

        let resp = self.client.execute(req).await.map_err(unreachable)?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(endpoint = %endpoint, %status, "Scraping service rejected request");
            return Err(RemoteServiceError::Rejected {
                endpoint: endpoint.to_string(),
                status,
                body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
            });
        }

        let bytes = resp.bytes().await.map_err(unreachable)?;
        debug!(endpoint = %endpoint, bytes = bytes.len(), "Scraping service responded");
        Ok(bytes)
    }
}

fn validate_keyword(keyword: &str) -> Result<&str, RemoteServiceError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(RemoteServiceError::invalid("keyword must not be empty"));
    }
    Ok(keyword)
}

fn validate_target_url(url: &str) -> Result<Url, RemoteServiceError> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| RemoteServiceError::invalid(format!("invalid url `{url}`: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(RemoteServiceError::invalid(format!(
            "unsupported url scheme `{other}`"
        ))),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves exactly one HTTP exchange on a random local port and returns
    /// the base URL plus a handle resolving to the raw request text.
    pub async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\n\
             content-type: text/csv\r\n\
             content-length: {}\r\n\
             connection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (format!("http://{addr}"), handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// A local address with nothing listening on it.
    pub async fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }
}
