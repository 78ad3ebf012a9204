//! Gradio Space enhancer.
//!
//! This module implements the `Enhancer` trait against a Gradio app, by
//! default the `ResembleAI/resemble-enhance` Space on Hugging Face.
//!
//! One enhancement is four HTTP exchanges:
//! 1. `POST {api}/upload` with the chunk bytes
//! 2. `POST {api}/call/{api_name}` referencing the uploaded file
//! 3. `GET {api}/call/{api_name}/{event_id}` reading the SSE result
//! 4. `GET` on every returned file URL
//!
//! The Space host and API prefix are resolved on first use and cached for
//! the lifetime of the client.

pub mod events;
pub mod file_data;

use async_trait::async_trait;
use denoise_abstraction::{EnhanceError, EnhanceOutput, EnhanceParameters, Enhancer};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::OnceCell;
use tracing::{debug, error, warn};

pub use events::{ServerEvent, parse_events};
pub use file_data::FileData;

/// Space used when none is configured.
pub const DEFAULT_SPACE: &str = "ResembleAI/resemble-enhance";

/// Hugging Face Hub used to resolve Space ids to hosts.
pub const DEFAULT_HUB_URL: &str = "https://huggingface.co";

/// Named endpoint of the enhancement function.
pub const DEFAULT_API_NAME: &str = "predict";

/// Per-request timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection options for a Gradio Space.
#[derive(Debug, Clone)]
pub struct GradioOptions {
    /// Base URL of the Hugging Face Hub.
    pub hub_url: String,
    /// Optional Hugging Face access token (private Spaces, higher quotas).
    pub hf_token: Option<String>,
    /// Endpoint name without the leading slash.
    pub api_name: String,
    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,
}

impl Default for GradioOptions {
    fn default() -> Self {
        Self {
            hub_url: DEFAULT_HUB_URL.to_string(),
            hf_token: None,
            api_name: DEFAULT_API_NAME.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Resolved location of the Gradio API.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SpaceEndpoint {
    /// App root, e.g. `https://resembleai-resemble-enhance.hf.space`.
    root: String,
    /// Route prefix from the app config, e.g. `/gradio_api`, or empty.
    api_prefix: String,
}

impl SpaceEndpoint {
    fn api_url(&self, route: &str) -> String {
        format!("{}{}/{}", self.root, self.api_prefix, route.trim_start_matches('/'))
    }
}

#[derive(Deserialize)]
struct SpaceHost {
    host: String,
}

#[derive(Deserialize)]
struct AppConfig {
    #[serde(default)]
    api_prefix: Option<String>,
}

#[derive(Deserialize)]
struct EventId {
    event_id: String,
}

/// Gradio Space implementation of `Enhancer`.
#[derive(Debug)]
pub struct GradioSpaceEnhancer {
    /// Space id (`owner/name`) or app URL.
    space: String,
    /// Connection options.
    options: GradioOptions,
    /// HTTP client shared by every request.
    client: Client,
    /// Lazily resolved API location.
    endpoint: OnceCell<SpaceEndpoint>,
    /// Where downloaded outputs are stored; removed on drop.
    downloads: TempDir,
}

impl GradioSpaceEnhancer {
    /// Creates a client for the given Space with default options.
    ///
    /// # Errors
    /// Returns an `EnhanceError` if the HTTP client or download directory
    /// cannot be created.
    pub fn new(space: String) -> Result<Self, EnhanceError> {
        Self::with_options(space, GradioOptions::default())
    }

    /// Creates a client with explicit options.
    ///
    /// No network traffic happens here; the Space is resolved on the first
    /// `enhance` call.
    ///
    /// # Errors
    /// Returns an `EnhanceError` if the HTTP client or download directory
    /// cannot be created.
    pub fn with_options(space: String, options: GradioOptions) -> Result<Self, EnhanceError> {
        let client = Client::builder()
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| EnhanceError::Other(format!("Failed to build HTTP client: {}", e)))?;
        let downloads = tempfile::Builder::new().prefix("denoise-").tempdir()?;

        Ok(Self { space, options, client, endpoint: OnceCell::new(), downloads })
    }

    /// Directory holding downloaded outputs.
    pub fn download_dir(&self) -> &Path {
        self.downloads.path()
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.options.hf_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a request and turns transport failures and error statuses into
    /// `EnhanceError`s.
    async fn send(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<Response, EnhanceError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            error!(error = %e, space = %self.space, operation, "Gradio request failed");
            if e.is_timeout() {
                EnhanceError::RequestError(format!("{} timed out: {}", operation, e))
            } else if e.is_connect() {
                EnhanceError::RequestError(format!(
                    "Space '{}' not reachable during {}: {}",
                    self.space, operation, e
                ))
            } else {
                EnhanceError::RequestError(format!("Network error during {}: {}", operation, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                status = %status,
                error = %error_text,
                operation,
                "Gradio API returned error status"
            );
            return Err(EnhanceError::ResponseError {
                status: status.as_u16(),
                message: format!("{} failed: {}", operation, error_text),
            });
        }

        Ok(response)
    }

    async fn endpoint(&self) -> Result<&SpaceEndpoint, EnhanceError> {
        self.endpoint.get_or_try_init(|| self.resolve_endpoint()).await
    }

    async fn resolve_endpoint(&self) -> Result<SpaceEndpoint, EnhanceError> {
        let root = if is_url(&self.space) {
            self.space.trim_end_matches('/').to_string()
        } else {
            self.lookup_space_host().await?
        };

        let config_url = format!("{}/config", root);
        let config: AppConfig = self
            .send(self.client.get(&config_url), "config fetch")
            .await?
            .json()
            .await
            .map_err(|e| {
                EnhanceError::SerializationError(format!("Failed to parse app config: {}", e))
            })?;

        let api_prefix = normalize_prefix(config.api_prefix.as_deref());
        debug!(root = %root, api_prefix = %api_prefix, "Resolved Gradio endpoint");

        Ok(SpaceEndpoint { root, api_prefix })
    }

    async fn lookup_space_host(&self) -> Result<String, EnhanceError> {
        let url = format!(
            "{}/api/spaces/{}/host",
            self.options.hub_url.trim_end_matches('/'),
            self.space
        );
        let host: SpaceHost =
            self.send(self.client.get(&url), "space lookup").await?.json().await.map_err(|e| {
                EnhanceError::SerializationError(format!("Failed to parse space host: {}", e))
            })?;

        Ok(host.host.trim_end_matches('/').to_string())
    }

    async fn upload(
        &self,
        endpoint: &SpaceEndpoint,
        input: &Path,
    ) -> Result<FileData, EnhanceError> {
        let bytes = tokio::fs::read(input).await?;
        let file_name = input
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| EnhanceError::Io(format!("Invalid filename: {}", input.display())))?
            .to_string();

        debug!(path = %input.display(), size = bytes.len(), "Uploading chunk");

        let form = Form::new().part("files", Part::bytes(bytes).file_name(file_name.clone()));
        let paths: Vec<String> = self
            .send(self.client.post(endpoint.api_url("upload")).multipart(form), "upload")
            .await?
            .json()
            .await
            .map_err(|e| {
                EnhanceError::SerializationError(format!("Failed to parse upload response: {}", e))
            })?;

        let path = paths.into_iter().next().ok_or_else(|| {
            EnhanceError::SerializationError("Upload response contained no paths".to_string())
        })?;

        Ok(FileData::uploaded(path, file_name))
    }

    async fn submit(
        &self,
        endpoint: &SpaceEndpoint,
        file: &FileData,
        parameters: &EnhanceParameters,
    ) -> Result<String, EnhanceError> {
        let body = json!({
            "data": [
                file,
                parameters.solver.as_str(),
                parameters.nfe,
                parameters.tau,
                parameters.denoise,
            ]
        });

        let url = endpoint.api_url(&format!("call/{}", self.options.api_name));
        let event: EventId =
            self.send(self.client.post(&url).json(&body), "call").await?.json().await.map_err(
                |e| EnhanceError::SerializationError(format!("Failed to parse event id: {}", e)),
            )?;

        Ok(event.event_id)
    }

    async fn await_result(
        &self,
        endpoint: &SpaceEndpoint,
        event_id: &str,
    ) -> Result<Vec<Value>, EnhanceError> {
        let url = endpoint.api_url(&format!("call/{}/{}", self.options.api_name, event_id));
        let body = self
            .send(self.client.get(&url), "result stream")
            .await?
            .text()
            .await
            .map_err(|e| {
                EnhanceError::RequestError(format!("Failed to read result stream: {}", e))
            })?;

        for event in parse_events(&body) {
            match event.event.as_str() {
                "complete" => {
                    return serde_json::from_str(&event.data).map_err(|e| {
                        EnhanceError::SerializationError(format!("Invalid result payload: {}", e))
                    });
                }
                "error" => {
                    let message = if event.data.is_empty() || event.data == "null" {
                        format!("Space reported an error for event {}", event_id)
                    } else {
                        event.data
                    };
                    return Err(EnhanceError::RemoteError(message));
                }
                other => debug!(event = other, event_id, "Ignoring stream event"),
            }
        }

        Err(EnhanceError::SerializationError(format!(
            "Result stream for event {} ended without a result",
            event_id
        )))
    }

    async fn download(
        &self,
        endpoint: &SpaceEndpoint,
        file: &FileData,
        dest: PathBuf,
    ) -> Result<PathBuf, EnhanceError> {
        let url = file
            .url
            .clone()
            .unwrap_or_else(|| endpoint.api_url(&format!("file={}", file.path)));

        let bytes = self
            .send(self.client.get(&url), "download")
            .await?
            .bytes()
            .await
            .map_err(|e| EnhanceError::RequestError(format!("Failed to read download: {}", e)))?;
        tokio::fs::write(&dest, &bytes).await?;

        debug!(url = %url, path = %dest.display(), size = bytes.len(), "Downloaded output");
        Ok(dest)
    }

    async fn fetch_output(
        &self,
        endpoint: &SpaceEndpoint,
        outputs: &[Value],
        slot: usize,
        event_id: &str,
    ) -> Result<Option<PathBuf>, EnhanceError> {
        let Some(value) = outputs.get(slot) else {
            return Ok(None);
        };
        let Some(file) = FileData::from_output(value)? else {
            return Ok(None);
        };

        let file_name = format!("{}-{}-{}", event_id, slot, file.local_name());
        let dest = self.downloads.path().join(file_name);
        self.download(endpoint, &file, dest).await.map(Some)
    }
}

#[async_trait]
impl Enhancer for GradioSpaceEnhancer {
    async fn enhance(
        &self,
        input: &Path,
        parameters: &EnhanceParameters,
    ) -> Result<EnhanceOutput, EnhanceError> {
        parameters.validate()?;

        debug!(
            space = %self.space,
            input = %input.display(),
            parameters = ?parameters,
            "GradioSpaceEnhancer enhancing chunk"
        );

        let endpoint = self.endpoint().await?;
        let uploaded = self.upload(endpoint, input).await?;
        let event_id = self.submit(endpoint, &uploaded, parameters).await?;
        let outputs = self.await_result(endpoint, &event_id).await?;

        let denoised = self.fetch_output(endpoint, &outputs, 0, &event_id).await?;
        // The enhanced slot is optional: its failure never fails the call.
        let enhanced = match self.fetch_output(endpoint, &outputs, 1, &event_id).await {
            Ok(path) => path,
            Err(e) => {
                warn!(event_id = %event_id, error = %e, "Skipping enhanced output");
                None
            }
        };

        Ok(EnhanceOutput { denoised, enhanced })
    }

    fn endpoint_id(&self) -> &str {
        &self.space
    }
}

fn is_url(space: &str) -> bool {
    space.starts_with("http://") || space.starts_with("https://")
}

fn normalize_prefix(prefix: Option<&str>) -> String {
    match prefix.map(|p| p.trim_matches('/')) {
        Some(p) if !p.is_empty() => format!("/{}", p),
        _ => String::new(),
    }
}
