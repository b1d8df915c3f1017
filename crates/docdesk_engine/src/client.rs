use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use docdesk_core::wire::{
    DeleteAllResponse, DeleteResponse, FileListing, IndexRequest, IndexResponse, IndexStats,
    SearchRequest, SearchResponse, UploadedFile,
};
use docdesk_core::FileCandidate;
use docdesk_logging::{desk_debug, desk_info, desk_warn, next_request_id};

use crate::upload::{streaming_form, ProgressSink};
use crate::{ApiError, FailureKind};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request deadline; `None` lets long indexing jobs run to completion.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

/// The eight document-backend operations.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn list_files(&self) -> Result<FileListing, ApiError>;

    async fn upload(
        &self,
        file: &FileCandidate,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<UploadedFile, ApiError>;

    async fn delete_file(&self, filename: &str) -> Result<DeleteResponse, ApiError>;

    async fn delete_all(&self) -> Result<DeleteAllResponse, ApiError>;

    async fn start_index(&self, request: &IndexRequest) -> Result<IndexResponse, ApiError>;

    async fn index_stats(&self) -> Result<IndexStats, ApiError>;

    async fn delete_index(&self) -> Result<DeleteResponse, ApiError>;

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base: Url,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{base} cannot carry a path"),
            ));
        }

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Joins path segments onto the base, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                ApiError::new(FailureKind::InvalidUrl, "base url cannot carry a path")
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.request(method, self.endpoint(segments)?))
    }

    async fn send(&self, label: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
        let id = next_request_id();
        desk_debug!("#{id} -> {label}");
        match builder.send().await {
            Ok(response) => {
                desk_info!("#{id} {label} -> {}", response.status());
                Ok(response)
            }
            Err(err) => {
                let err = map_reqwest_error(err);
                desk_warn!("#{id} {label} failed: {err}");
                Err(err)
            }
        }
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn list_files(&self) -> Result<FileListing, ApiError> {
        let builder = self.request(Method::GET, &["api", "files"])?;
        decode(self.send("GET /api/files", builder).await?).await
    }

    async fn upload(
        &self,
        file: &FileCandidate,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<UploadedFile, ApiError> {
        let form = streaming_form(file, sink).await?;
        let builder = self.request(Method::POST, &["api", "upload"])?.multipart(form);
        let label = format!("POST /api/upload {}", file.name);
        decode(self.send(&label, builder).await?).await
    }

    async fn delete_file(&self, filename: &str) -> Result<DeleteResponse, ApiError> {
        let builder = self.request(Method::DELETE, &["api", "delete", filename])?;
        let label = format!("DELETE /api/delete/{filename}");
        let response: DeleteResponse = decode(self.send(&label, builder).await?).await?;
        if !response.success {
            return Err(ApiError::from_server(FailureKind::Rejected, response.error));
        }
        Ok(response)
    }

    async fn delete_all(&self) -> Result<DeleteAllResponse, ApiError> {
        let builder = self.request(Method::DELETE, &["api", "delete-all"])?;
        let response: DeleteAllResponse =
            decode(self.send("DELETE /api/delete-all", builder).await?).await?;
        if !response.success {
            return Err(ApiError::from_server(FailureKind::Rejected, response.error));
        }
        Ok(response)
    }

    async fn start_index(&self, request: &IndexRequest) -> Result<IndexResponse, ApiError> {
        let builder = self.request(Method::POST, &["api", "index"])?.json(request);
        let response: IndexResponse = decode(self.send("POST /api/index", builder).await?).await?;
        if !response.success {
            return Err(ApiError::from_server(FailureKind::Rejected, response.error));
        }
        Ok(response)
    }

    async fn index_stats(&self) -> Result<IndexStats, ApiError> {
        let builder = self.request(Method::GET, &["api", "index-stats"])?;
        decode(self.send("GET /api/index-stats", builder).await?).await
    }

    async fn delete_index(&self) -> Result<DeleteResponse, ApiError> {
        let builder = self.request(Method::DELETE, &["api", "delete-index"])?;
        let response: DeleteResponse =
            decode(self.send("DELETE /api/delete-index", builder).await?).await?;
        if !response.success {
            return Err(ApiError::from_server(FailureKind::Rejected, response.error));
        }
        Ok(response)
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        let builder = self.request(Method::POST, &["api", "search"])?.json(request);
        let response: SearchResponse =
            decode(self.send("POST /api/search", builder).await?).await?;
        if !response.success {
            return Err(ApiError::from_server(FailureKind::Rejected, response.error));
        }
        Ok(response)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    if !status.is_success() {
        let server_message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.error);
        return Err(ApiError::from_server(
            FailureKind::HttpStatus(status.as_u16()),
            server_message,
        ));
    }
    serde_json::from_slice(&body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ApiError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
