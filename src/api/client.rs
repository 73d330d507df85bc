//! Authenticated request pipeline.
//!
//! Every call to the workspace service goes through [`ApiClient::send`]:
//! the bearer credential is attached from the [`CredentialStore`], a 401
//! triggers one credential renewal, and the original request is retried
//! exactly once with the renewed credential.
//!
//! Renewal is single-flight. Concurrent requests that are rejected with
//! the same stale credential queue on one lock; the first performs the
//! renewal, the others observe the new credential and go straight to
//! their retry.

use std::sync::Arc;

use notevault_models::{ErrorResponse, RefreshRequest, TokenPair};
use reqwest::{header, multipart, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::error::{Error, Result, GENERIC_FAILURE};
use crate::services::CredentialStore;

pub const REFRESH_ENDPOINT: &str = "/auth/refresh";

/// Whether a request carries the access credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Attach the bearer credential (if held) and renew on 401.
    Required,
    /// Send without credentials; a 401 is returned as-is.
    Skip,
}

/// One part of a multipart form.
///
/// Parts own their data so the form can be rebuilt for the retry.
#[derive(Debug, Clone)]
pub struct MultipartPart {
    name: String,
    content: PartContent,
}

#[derive(Debug, Clone)]
enum PartContent {
    Text(String),
    File {
        bytes: Vec<u8>,
        file_name: String,
        mime_type: String,
    },
}

impl MultipartPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: PartContent::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content: PartContent::File {
                bytes,
                file_name: file_name.into(),
                mime_type: mime_type.into(),
            },
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// Sent as `multipart/form-data`; the boundary is set by the transport.
    Multipart(Vec<MultipartPart>),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| Error::InvalidInput(format!("Failed to encode request body: {}", e)))
    }
}

/// Raw body of a binary download.
#[derive(Debug, Clone)]
pub struct BinaryResponse {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Client for the workspace service. Cheap to clone; clones share the
/// HTTP connection pool, the credential store and the renewal lock.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: Client,
    base_url: String,
    credentials: CredentialStore,
    /// Serialises credential renewal.
    renewal: Mutex<()>,
}

impl ApiClient {
    /// Create a client for `config.base_url` reading credentials from
    /// `credentials`.
    pub fn new(config: &ApiConfig, credentials: CredentialStore) -> Result<Self> {
        url::Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", config.base_url, e)))?;

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                credentials,
                renewal: Mutex::new(()),
            }),
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.inner.base_url, endpoint)
    }

    /// Authenticated GET.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.send(Method::GET, endpoint, RequestBody::Empty, Auth::Required)
            .await
    }

    /// Authenticated POST with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, endpoint: &str, body: &B) -> Result<T> {
        self.send(Method::POST, endpoint, RequestBody::json(body)?, Auth::Required)
            .await
    }

    /// Authenticated PUT with a JSON body.
    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, endpoint: &str, body: &B) -> Result<T> {
        self.send(Method::PUT, endpoint, RequestBody::json(body)?, Auth::Required)
            .await
    }

    /// Authenticated DELETE.
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.send(Method::DELETE, endpoint, RequestBody::Empty, Auth::Required)
            .await
    }

    /// Send a request and decode the JSON response as `T`.
    ///
    /// With [`Auth::Required`], a 401 while a refresh credential is held
    /// triggers one renewal and one retry. If renewal fails the original
    /// 401 is returned and the credential store is left empty.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: RequestBody,
        auth: Auth,
    ) -> Result<T> {
        let token = match auth {
            Auth::Required => self.credentials().access_token(),
            Auth::Skip => None,
        };

        let mut response = self.issue(&method, endpoint, &body, token.as_deref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED
            && auth == Auth::Required
            && self.credentials().refresh_token().is_some()
        {
            debug!(%method, endpoint, "Request unauthorized, renewing credentials");

            if self.renew_after(token.as_deref()).await {
                let renewed = self.credentials().access_token();
                response = self
                    .issue(&method, endpoint, &body, renewed.as_deref())
                    .await?;
            }
        }

        Self::parse(response).await
    }

    /// Fetch a binary body. The bearer credential is attached directly;
    /// there is no renewal or retry on this path.
    pub async fn download(&self, endpoint: &str) -> Result<BinaryResponse> {
        let mut request = self.inner.http.get(self.url(endpoint));
        if let Some(token) = self.credentials().access_token() {
            request = request.bearer_auth(token);
        }

        debug!(endpoint, "Downloading");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, %status, "Download failed");
            return Err(Error::Download {
                status: Some(status),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();

        Ok(BinaryResponse {
            content_type,
            bytes,
        })
    }

    /// Renew the credential pair unconditionally. Returns whether a new
    /// pair was stored; on failure the store is cleared.
    pub async fn renew(&self) -> bool {
        let _guard = self.inner.renewal.lock().await;
        self.renew_locked().await
    }

    /// Renew after a request sent with `stale` was rejected, unless a
    /// concurrent caller already replaced that credential.
    async fn renew_after(&self, stale: Option<&str>) -> bool {
        let _guard = self.inner.renewal.lock().await;

        let current = self.credentials().read();
        if current.access_token.is_some() && current.access_token.as_deref() != stale {
            debug!("Credentials were renewed by a concurrent request");
            return true;
        }

        self.renew_locked().await
    }

    async fn renew_locked(&self) -> bool {
        let Some(refresh_token) = self.credentials().refresh_token() else {
            return false;
        };

        let renewed = match self.request_renewal(&refresh_token).await {
            Ok(response) if response.status().is_success() => response
                .json::<TokenPair>()
                .await
                .map_err(|e| format!("invalid renewal response: {}", e)),
            Ok(response) => Err(format!("renewal rejected with {}", response.status())),
            Err(e) => Err(e.to_string()),
        };

        match renewed {
            Ok(pair) => {
                self.credentials()
                    .write(pair.access_token, pair.refresh_token);
                info!("Credentials renewed");
                true
            }
            Err(reason) => {
                warn!(%reason, "Credential renewal failed, ending session");
                self.credentials().clear();
                false
            }
        }
    }

    async fn request_renewal(&self, refresh_token: &str) -> Result<Response> {
        let body = RequestBody::json(&RefreshRequest {
            refresh_token: Some(refresh_token),
        })?;
        self.issue(&Method::POST, REFRESH_ENDPOINT, &body, None).await
    }

    async fn issue(
        &self,
        method: &Method,
        endpoint: &str,
        body: &RequestBody,
        token: Option<&str>,
    ) -> Result<Response> {
        let mut request = self.inner.http.request(method.clone(), self.url(endpoint));

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        request = match body {
            RequestBody::Empty => request.header(header::CONTENT_TYPE, "application/json"),
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart(parts) => request.multipart(build_form(parts)?),
        };

        debug!(%method, endpoint, authenticated = token.is_some(), "Sending request");
        Ok(request.send().await?)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&bytes)
                .ok()
                .and_then(|body| body.error)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            debug!(%status, %message, "Request failed");
            return Err(Error::from_status(status, message));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            debug!(%status, error = %e, "Unexpected response body");
            Error::Decode(e.to_string())
        })
    }
}

fn build_form(parts: &[MultipartPart]) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();

    for part in parts {
        form = match &part.content {
            PartContent::Text(value) => form.text(part.name.clone(), value.clone()),
            PartContent::File {
                bytes,
                file_name,
                mime_type,
            } => {
                let file = multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime_type)
                    .map_err(|e| {
                        Error::InvalidInput(format!("Invalid MIME type '{}': {}", mime_type, e))
                    })?;
                form.part(part.name.clone(), file)
            }
        };
    }

    Ok(form)
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("credentials", &self.inner.credentials)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> Result<ApiClient> {
        ApiClient::new(
            &crate::config::Config::for_api(base_url).api,
            CredentialStore::in_memory(),
        )
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = client("not a url").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_endpoint_is_appended_to_base_path() {
        let api = client("http://localhost:8080/api/v1/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:8080/api/v1");
        assert_eq!(api.url("/folders/3"), "http://localhost:8080/api/v1/folders/3");
    }

    #[test]
    fn test_form_rejects_bad_mime_type() {
        let parts = vec![MultipartPart::file("file", "a.bin", "not a mime", vec![1])];
        assert!(matches!(build_form(&parts), Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_renew_without_refresh_token_fails() {
        let api = client("http://127.0.0.1:9").unwrap();
        assert!(!api.renew().await);
        assert!(!api.credentials().has_session());
    }
}
