use bytes::Bytes;
use earth_gif_common::config::CatalogConfig;
use earth_gif_common::frame::{FrameDescriptor, FrameError};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("{op}: HTTP request failed: {source}")]
    Request {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{op}: HTTP status {status}")]
    Status { op: &'static str, status: u16 },
    #[error("{op}: malformed JSON body: {source}")]
    Decode {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Timestamp(#[from] FrameError),
    #[error("fetching frame {image} failed: {source}")]
    Frame {
        image: String,
        #[source]
        source: Box<CatalogError>,
    },
    #[error("fetch task failed: {0}")]
    Task(String),
    #[error("fetch finished with {missing} frame(s) unaccounted for")]
    Incomplete { missing: usize },
}

impl CatalogError {
    /// Transport failure with the URL stripped, since its query carries the API key.
    fn request(op: &'static str, source: reqwest::Error) -> Self {
        CatalogError::Request {
            op,
            source: source.without_url(),
        }
    }
}

/// Read-only client for the imagery catalog and its PNG archive.
///
/// Holds one pooled HTTP client; requests carry no retries and no timeout
/// beyond the transport default.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    archive_url: String,
    api_key: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig, api_key: impl Into<String>) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(CatalogError::Client)?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            archive_url: config.archive_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Every day the catalog has imagery for. Entries carry only `date`.
    pub async fn list_all_dates(&self) -> Result<Vec<FrameDescriptor>, CatalogError> {
        let url = format!("{}/all", self.base_url);
        self.get_json("list_all_dates", &url).await
    }

    /// Frames captured on `date` (`YYYY-MM-DD`), or on the most recent day when `None`.
    pub async fn list_frames_for_date(
        &self,
        date: Option<&str>,
    ) -> Result<Vec<FrameDescriptor>, CatalogError> {
        let url = match date {
            Some(date) => format!("{}/date/{date}", self.base_url),
            None => self.base_url.clone(),
        };
        self.get_json("list_frames_for_date", &url).await
    }

    /// Raw PNG bytes of one frame. `archive_date` is `yyyy/mm/dd`.
    pub async fn fetch_frame_bytes(
        &self,
        image: &str,
        archive_date: &str,
    ) -> Result<Bytes, CatalogError> {
        const OP: &str = "fetch_frame_bytes";
        let url = format!("{}/{archive_date}/png/{image}.png", self.archive_url);
        let response = self.get(OP, &url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| CatalogError::request(OP, source))?;
        debug!(image, bytes = body.len(), "fetched frame");
        Ok(body)
    }

    async fn get_json(
        &self,
        op: &'static str,
        url: &str,
    ) -> Result<Vec<FrameDescriptor>, CatalogError> {
        let response = self.get(op, url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| CatalogError::request(op, source))?;
        let entries: Vec<FrameDescriptor> =
            serde_json::from_slice(&body).map_err(|source| CatalogError::Decode { op, source })?;
        debug!(op, entries = entries.len(), "catalog response decoded");
        Ok(entries)
    }

    async fn get(&self, op: &'static str, url: &str) -> Result<reqwest::Response, CatalogError> {
        debug!(op, url, "catalog request");
        let response = self
            .http
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| CatalogError::request(op, source))?;

        if !response.status().is_success() {
            return Err(CatalogError::Status {
                op,
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}
