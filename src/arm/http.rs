//! ARM REST client over reqwest.
//!
//! A deliberately thin transport: one request per call, bearer-token auth,
//! no retries. Authentication is a pre-acquired token (for instance from
//! `az account get-access-token`); acquiring and refreshing it is left to the
//! caller.

use super::{
    ArmError, ArmResult, Page, PageRequest, PendingOperation, Provisioning, ReadOutcome,
    ResourceClient, DEFAULT_ENDPOINT,
};
use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Error envelope ARM wraps failures in.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Builder for [`HttpResourceClient`].
#[derive(Debug, Clone)]
pub struct HttpResourceClientBuilder {
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
    user_agent: String,
}

impl HttpResourceClientBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("armctl/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the ARM endpoint (sovereign clouds, test servers).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the bearer token sent with every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> ArmResult<HttpResourceClient> {
        let endpoint = Url::parse(&self.endpoint)
            .map_err(|e| ArmError::Transport(format!("invalid endpoint '{}': {}", self.endpoint, e)))?;

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| ArmError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(HttpResourceClient {
            client,
            endpoint,
            token: self.token,
        })
    }
}

impl Default for HttpResourceClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// [`ResourceClient`] speaking the ARM REST protocol.
pub struct HttpResourceClient {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpResourceClient {
    pub fn builder() -> HttpResourceClientBuilder {
        HttpResourceClientBuilder::new()
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url_for(&self, path: &str, api_version: &str) -> ArmResult<Url> {
        let mut url = self
            .endpoint
            .join(path)
            .map_err(|e| ArmError::Transport(format!("invalid resource path '{}': {}", path, e)))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> ArmResult<Response> {
        builder
            .send()
            .await
            .map_err(|e| ArmError::Transport(e.to_string()))
    }

    async fn json_body(response: Response) -> ArmResult<serde_json::Value> {
        let text = response
            .text()
            .await
            .map_err(|e| ArmError::Transport(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ArmError::Decode(e.to_string()))
    }

    /// Convert a non-success response into an [`ArmError::Status`].
    async fn status_error(response: Response) -> ArmError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => ArmError::Status {
                status,
                code: envelope.error.code,
                message: envelope.error.message.unwrap_or_default(),
            },
            Err(_) => ArmError::status(status, text),
        }
    }
}

#[async_trait]
impl ResourceClient for HttpResourceClient {
    async fn get(&self, resource_id: &str, api_version: &str) -> ReadOutcome {
        let result: ArmResult<serde_json::Value> = async {
            let url = self.url_for(resource_id, api_version)?;
            trace!("GET {}", url);
            let response = self.send(self.request(Method::GET, url)).await?;
            if !response.status().is_success() {
                return Err(Self::status_error(response).await);
            }
            Self::json_body(response).await
        }
        .await;
        ReadOutcome::from_result(result)
    }

    async fn create_or_update(
        &self,
        resource_id: &str,
        api_version: &str,
        payload: &serde_json::Value,
    ) -> ArmResult<Provisioning> {
        let url = self.url_for(resource_id, api_version)?;
        debug!("PUT {}", url);
        let response = self
            .send(self.request(Method::PUT, url).json(payload))
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(response).await);
        }

        let body = Self::json_body(response).await?;
        let settled = matches!(
            super::poller::provisioning_state(&body),
            None | Some("Succeeded") | Some("succeeded")
        );

        if status == StatusCode::ACCEPTED || body.is_null() || !settled {
            return Ok(Provisioning::Accepted(PendingOperation::new(resource_id)));
        }
        Ok(Provisioning::Completed(body))
    }

    async fn delete(
        &self,
        resource_id: &str,
        api_version: &str,
    ) -> ArmResult<Option<PendingOperation>> {
        let url = self.url_for(resource_id, api_version)?;
        debug!("DELETE {}", url);
        let response = self.send(self.request(Method::DELETE, url)).await?;

        match response.status() {
            StatusCode::ACCEPTED => Ok(Some(PendingOperation::new(resource_id))),
            // Already gone.
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(None),
            _ => Err(Self::status_error(response).await),
        }
    }

    async fn list_page(&self, request: &PageRequest, api_version: &str) -> ArmResult<Page> {
        let url = match request {
            PageRequest::Scope(path) => self.url_for(path, api_version)?,
            // nextLink already carries api-version and the skip token.
            PageRequest::NextLink(link) => Url::parse(link)
                .map_err(|e| ArmError::Decode(format!("invalid nextLink '{}': {}", link, e)))?,
        };
        trace!("GET {}", url);
        let response = self.send(self.request(Method::GET, url)).await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        let body = Self::json_body(response).await?;
        serde_json::from_value(body).map_err(|e| ArmError::Decode(e.to_string()))
    }

    fn describe(&self) -> String {
        self.endpoint.to_string()
    }
}
