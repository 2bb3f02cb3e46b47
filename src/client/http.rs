//! HTTP client for the registration service.
//!
//! ## Endpoints
//!
//! All paths are relative to the configured endpoint
//! (default `http://localhost:8080/api/v1/files`):
//!
//! | Method | Path                       | Body / response                  |
//! |--------|----------------------------|----------------------------------|
//! | POST   | `/upload`                  | multipart `file`, `authorAddress` → `UploadResult` |
//! | GET    | `/verify/{poseidonHash}`   | → `FileRecord`                   |
//! | GET    | `/all`                     | → `[FileRecord]`                 |
//! | GET    | `/author/{authorAddress}`  | → `[FileRecord]`                 |
//! | GET    | `/health`                  | → `HealthStatus`                 |
//!
//! Non-2xx answers become [`Error::Service`], carrying the body's `error`
//! field when the service supplied one.

use super::service::RegistryService;
use super::types::{FileRecord, HealthStatus, UploadFile, UploadResult};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Error body returned by the service on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the registration service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: Client,
    base: Url,
}

impl HttpRegistry {
    /// Create a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not a valid base URL or the
    /// HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base = Url::parse(&config.endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint {}: {e}", config.endpoint)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "endpoint cannot be a base URL: {}",
                config.endpoint
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        info!("Registry client targeting {}", base);
        Ok(Self { client, base })
    }

    /// Create a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&ClientConfig::default())
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build an endpoint URL by appending path segments to the base.
    ///
    /// Each segment is percent-escaped as a single path segment, so a hash
    /// is sent literally (prefix included) and never split.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("endpoint cannot be a base URL: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        read_json(response).await
    }
}

impl RegistryService for HttpRegistry {
    async fn upload(&self, file: UploadFile, author_address: String) -> Result<UploadResult> {
        let url = self.endpoint(&["upload"])?;
        debug!(
            "POST {} ({} bytes, file {})",
            url,
            file.size(),
            file.name
        );

        let form = Form::new()
            .part("file", file_part(file))
            .text("authorAddress", author_address);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    async fn verify(&self, poseidon_hash: String) -> Result<FileRecord> {
        let url = self.endpoint(&["verify", &poseidon_hash])?;
        let record: FileRecord = self.get_json(url).await?;
        Ok(record.normalized())
    }

    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let url = self.endpoint(&["all"])?;
        let records: Vec<FileRecord> = self.get_json(url).await?;
        debug!("Fetched {} records", records.len());
        Ok(records.into_iter().map(FileRecord::normalized).collect())
    }

    async fn files_by_author(&self, author_address: String) -> Result<Vec<FileRecord>> {
        let url = self.endpoint(&["author", &author_address])?;
        let records: Vec<FileRecord> = self.get_json(url).await?;
        Ok(records.into_iter().map(FileRecord::normalized).collect())
    }

    async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint(&["health"])?;
        self.get_json(url).await
    }
}

fn file_part(file: UploadFile) -> Part {
    let UploadFile {
        name,
        content_type,
        data,
    } = file;
    let part = Part::bytes(data.to_vec()).file_name(name.clone());
    match content_type {
        Some(mime) => part.mime_str(&mime).unwrap_or_else(|e| {
            warn!("Ignoring unusable content type {mime}: {e}");
            Part::bytes(data.to_vec()).file_name(name)
        }),
        None => part,
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    warn!("Registry request failed before a response: {e}");
    Error::Transport(e.to_string())
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await.map_err(transport_error)?;

    if !status.is_success() {
        let message = error_message(&body);
        warn!(
            "Registry answered {}: {}",
            status,
            message.as_deref().unwrap_or("<no error message>")
        );
        return Err(Error::Service {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|e| {
        warn!("Unexpected response body: {e}");
        Error::Parse(e.to_string())
    })
}

/// Extract the `error` field from a failure body, if it has one.
fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
}
