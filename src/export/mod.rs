//! Export actions: chart snapshots and CSVs produced by the scraping service.
//!
//! [`ExportCoordinator`] never touches the comparison session. Its remote
//! operations borrow `&self`, so a keyword CSV and a URL analysis can be
//! awaited together, each reporting its own outcome.

pub mod render;

use bytes::Bytes;
use tracing::info;

use crate::analyzers::types::Slot;
use crate::error::{RemoteServiceError, SnapshotError};
use crate::fetch::{HttpClient, ScrapingService};
use render::Renderer;

/// A rendered chart plus the file name it should be saved under.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A CSV returned by the scraping service plus a suggested file name.
#[derive(Debug, Clone)]
pub struct RemotePayload {
    pub file_name: String,
    pub bytes: Bytes,
}

pub struct ExportCoordinator<C, R> {
    service: ScrapingService<C>,
    renderer: R,
}

impl<C: HttpClient, R: Renderer> ExportCoordinator<C, R> {
    pub fn new(service: ScrapingService<C>, renderer: R) -> Self {
        Self { service, renderer }
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Rasterizes `view` and names the image `"<first> vs <second>.<ext>"`.
    #[tracing::instrument(skip(self))]
    pub async fn export_snapshot(
        &self,
        view: &str,
        label_a: &str,
        label_b: &str,
    ) -> Result<Snapshot, SnapshotError> {
        let bytes = self.renderer.rasterize(view).await?;
        let file_name = snapshot_file_name(label_a, label_b, self.renderer.extension());
        info!(file_name = %file_name, bytes = bytes.len(), "Snapshot exported");
        Ok(Snapshot { file_name, bytes })
    }

    pub async fn request_remote_csv(
        &self,
        keyword: &str,
    ) -> Result<RemotePayload, RemoteServiceError> {
        let bytes = self.service.fetch_keyword_csv(keyword).await?;
        let file_name = format!("{}.csv", sanitize(keyword.trim()));
        info!(file_name = %file_name, bytes = bytes.len(), "Keyword CSV received");
        Ok(RemotePayload { file_name, bytes })
    }

    pub async fn request_remote_analysis(
        &self,
        keyword: &str,
        url: &str,
    ) -> Result<RemotePayload, RemoteServiceError> {
        let bytes = self.service.fetch_url_analysis(keyword, url).await?;
        let host = reqwest::Url::parse(url.trim())
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        let file_name = format!("{}_{}.csv", sanitize(keyword.trim()), sanitize(&host));
        info!(file_name = %file_name, bytes = bytes.len(), "URL analysis received");
        Ok(RemotePayload { file_name, bytes })
    }
}

/// Builds the snapshot file name from the two dataset labels, in order.
///
/// Directory components and a trailing extension are dropped from each
/// label; a blank label is replaced by its slot name.
pub fn snapshot_file_name(label_a: &str, label_b: &str, extension: &str) -> String {
    format!(
        "{} vs {}.{extension}",
        label_stem(label_a, Slot::First),
        label_stem(label_b, Slot::Second)
    )
}

fn label_stem(label: &str, slot: Slot) -> String {
    let name = label
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(label)
        .trim();
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    };
    if stem.is_empty() {
        slot.as_str().to_string()
    } else {
        stem.to_string()
    }
}

fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
