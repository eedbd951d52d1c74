//! API client for the demo authentication server.
//!
//! `ApiClient` performs one request per call, optionally attaching the bearer
//! token held by the `SessionStore`, and normalises every outcome into an
//! `ApiResult`. It never retries and never writes to the session.

use std::sync::Arc;

use anyhow::Result;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::{Credential, Session, SessionStore};
use crate::models::{DemoEndpoint, DemoInfo, LoginResponse};

use super::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use super::{ApiError, ApiResult};

// ============================================================================
// Constants
// ============================================================================

/// Login path, relative to the base URL
const LOGIN_PATH: &str = "auth/login";

const JSON_CONTENT_TYPE: &str = "application/json";

/// API client for the demo server.
/// Clone is cheap - the transport and session store are shared.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    session: Arc<SessionStore>,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    /// Create a client that talks to `base_url` over HTTP
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(base_url, session, Arc::new(transport)))
    }

    /// Create a client on an explicit transport
    pub fn with_transport(
        base_url: &str,
        session: Arc<SessionStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            session,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Absolute URL for a path relative to the base URL
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Exchange credentials for a session.
    ///
    /// The caller decides whether to persist the result with
    /// `SessionStore::save`.
    pub async fn login(&self, credential: &Credential) -> ApiResult<Session> {
        let body = serde_json::to_string(credential).map_err(|e| ApiError::parse(&e))?;
        let request = HttpRequest::post(self.url_for(LOGIN_PATH), body)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .and_then(|r| r.header(ACCEPT, JSON_CONTENT_TYPE))
            .map_err(|e| ApiError::network(&e))?;

        debug!(user = %credential.username, "Sending login request");
        let response: LoginResponse = self.execute(request).await?;
        debug!(user = %response.username, roles = response.roles.len(), "Login accepted");

        Ok(response.into())
    }

    /// GET a path and return the `info` field of the response.
    ///
    /// With `requires_auth` and no stored token this fails with
    /// `AuthRequired` without touching the network. A body without `info`
    /// yields an empty string.
    pub async fn call(&self, path: &str, requires_auth: bool) -> ApiResult<String> {
        let demo: DemoInfo = self.get_json(path, requires_auth).await?;
        match demo.info {
            Some(info) => Ok(info),
            None => {
                warn!(path = path, "Response has no info field");
                Ok(String::new())
            }
        }
    }

    /// Call one of the demo endpoints
    pub async fn demo(&self, endpoint: DemoEndpoint) -> ApiResult<String> {
        self.call(endpoint.path(), endpoint.requires_auth()).await
    }

    /// GET a path and deserialize the whole success body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, requires_auth: bool) -> ApiResult<T> {
        let token = if requires_auth {
            match self.session.current_token() {
                Some(token) => Some(token),
                None => {
                    debug!(path = path, "Protected call without a token");
                    return Err(ApiError::AuthRequired);
                }
            }
        } else {
            None
        };

        let mut request = HttpRequest::get(self.url_for(path))
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .map_err(|e| ApiError::network(&e))?;
        if let Some(token) = token {
            request = request
                .header(AUTHORIZATION, &format!("Bearer {}", token))
                .map_err(|e| ApiError::network(&e))?;
        }

        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: HttpRequest) -> ApiResult<T> {
        let method = request.method.clone();
        let url = request.url.clone();
        debug!(%method, url = %url, authenticated = request.headers.contains_key(AUTHORIZATION), "Sending request");

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(%method, url = %url, error = %format!("{:#}", e), "Request failed");
            ApiError::network(&e)
        })?;

        Self::check_response(&url, response)
    }

    /// Turn a raw response into the success payload or a typed error
    fn check_response<T: DeserializeOwned>(url: &str, response: HttpResponse) -> ApiResult<T> {
        if response.status.is_success() {
            serde_json::from_str(&response.body).map_err(|e| {
                warn!(url = url, error = %e, body = %ApiError::truncate_body(&response.body), "Failed to parse response");
                ApiError::parse(&e)
            })
        } else {
            let err = ApiError::from_status(response.status, &response.body);
            warn!(
                url = url,
                status = response.status.as_u16(),
                body = %ApiError::truncate_body(&response.body),
                "Server returned an error"
            );
            Err(err)
        }
    }
}
