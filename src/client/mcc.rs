//! MCC API client implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;

use super::api::{AuthApi, CatalogApi, ClassificationApi};
use super::models::{
    Capability, Classification, ClassificationPage, JobStarted, JobStatus, JwtToken,
    LoginResponse, LoginSession, RunJobRequest, SearchRequest, SearchResponse, Session,
};
use super::pagination::PaginationParams;
use crate::config::{Credentials, is_expiring};
use crate::error::{ApiError, Result};

/// Decode base64url (URL-safe base64 without padding)
fn base64_decode_url(input: &str) -> std::result::Result<Vec<u8>, String> {
    use base64::{Engine as _, engine::general_purpose};

    general_purpose::URL_SAFE_NO_PAD
        .decode(input.trim_end_matches('='))
        .map_err(|e| e.to_string())
}

/// OAuth client the catalog UI uses for the JWT exchange
const JWT_CLIENT_ID: &str = "cdlg_app";
const JWT_NONCE: &str = "g3t69BWB49BHHNn";

/// Lifetime assumed when a JWT carries no `exp` claim
const DEFAULT_JWT_LIFETIME_MINUTES: i64 = 30;

/// Rate limit: 6 requests per second
const RATE_LIMIT_PER_SECOND: u32 = 6;

const CLASSIFICATIONS_PATH: &str = "/ccgf-metadata-discovery/api/v1/classifications";

/// MCC (IDMC + CDGC) API client
pub struct MccClient {
    http: HttpClient,
    login_url: String,
    pod_api_url: String,
    cdgc_api_url: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    auth_state: Arc<RwLock<AuthState>>,
}

/// Internal authentication state
#[derive(Debug, Clone)]
struct AuthState {
    username: String,
    password: String,
    session: Option<Session>,
}

impl MccClient {
    /// Create a new client; no request is made until the first call.
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(
            std::num::NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(std::num::NonZeroU32::MIN),
        );
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            http,
            login_url: credentials.login_url.clone(),
            pod_api_url: credentials.pod_api_url.clone(),
            cdgc_api_url: credentials.cdgc_api_url.clone(),
            rate_limiter,
            auth_state: Arc::new(RwLock::new(AuthState {
                username: credentials.username.clone(),
                password: credentials.password.clone(),
                session: None,
            })),
        })
    }

    /// Create a client and authenticate immediately.
    pub async fn connect(credentials: &Credentials) -> Result<Self> {
        let client = Self::new(credentials)?;
        let session = client.establish_session().await?;
        client.set_session(session).await;
        Ok(client)
    }

    /// Set the CDGC session
    pub async fn set_session(&self, session: Session) {
        self.auth_state.write().await.session = Some(session);
    }

    /// Current CDGC session, if authenticated
    pub async fn session(&self) -> Option<Session> {
        self.auth_state.read().await.session.clone()
    }

    /// Log in and exchange the IDMC session for a JWT
    async fn establish_session(&self) -> Result<Session> {
        let (username, password) = {
            let state = self.auth_state.read().await;
            (state.username.clone(), state.password.clone())
        };

        debug!("Logging in to {} as {}", self.login_url, username);
        let login = self.login(&username, &password).await?;
        let jwt = self.generate_jwt(&login).await?;
        debug!("Session established for org {}", login.org_id);

        Ok(Session::new(&login, jwt))
    }

    /// Get the current session, refreshing if it expires within 5 minutes
    async fn valid_session(&self) -> Result<Session> {
        if let Some(session) = self.session().await {
            if !is_expiring(session.expires_at) {
                return Ok(session);
            }
        }

        let session = self.establish_session().await?;
        self.set_session(session.clone()).await;
        Ok(session)
    }

    fn cdgc_url(&self, path: &str) -> String {
        format!("{}{}", self.cdgc_api_url, path)
    }

    /// Make an authenticated CDGC request.
    ///
    /// A 401 triggers one fresh login before giving up.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<T> {
        let url = self.cdgc_url(path);
        let mut reauthenticated = false;

        loop {
            self.rate_limiter.until_ready().await;
            let session = self.valid_session().await?;

            debug!("{} {}", method, url);
            let mut request = self
                .http
                .request(method.clone(), &url)
                .bearer_auth(&session.token)
                .header("X-INFA-ORG-ID", &session.org_id)
                .header("Accept", "application/json")
                .query(query);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await.map_err(ApiError::from)?;

            if response.status() == StatusCode::UNAUTHORIZED && !reauthenticated {
                debug!("Received 401, re-authenticating");
                reauthenticated = true;
                let session = self.establish_session().await?;
                self.set_session(session).await;
                continue;
            }

            return parse_response(response).await;
        }
    }
}

/// Pull a readable message out of an error body: the JSON `message` field
/// when present, otherwise the raw text.
pub fn extract_error_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["message", "error_description", "error"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    trimmed.to_string()
}

/// Map a response to a parsed body or an [`ApiError`]
async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;
        // 204 and friends: let `T` decide whether "no body" is acceptable
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        let data = serde_json::from_str::<T>(text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        return Ok(data);
    }

    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body);

    let err = match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        StatusCode::NOT_FOUND => ApiError::NotFound(if message.is_empty() {
            "Resource not found".to_string()
        } else {
            message
        }),
        StatusCode::TOO_MANY_REQUESTS => {
            ApiError::RateLimit(Duration::from_secs(retry_after.unwrap_or(60)))
        }
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::BadRequest(format!("{} ({})", message, status.as_u16()))
        }
        status if status.is_server_error() => {
            ApiError::ServerError(format!("{} ({})", message, status.as_u16()))
        }
        status => ApiError::UnexpectedStatus {
            status: status.as_u16(),
            message,
        },
    };
    Err(err.into())
}

/// Read the `exp` claim of a JWT, if it has one
fn jwt_expiry(token: &str) -> Result<Option<chrono::DateTime<Utc>>> {
    #[derive(Deserialize)]
    struct JwtPayload {
        exp: Option<i64>,
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ApiError::InvalidToken.into());
    }

    let payload_bytes = base64_decode_url(parts[1])
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to decode JWT payload: {}", e)))?;
    let payload: JwtPayload = serde_json::from_slice(&payload_bytes)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JWT payload: {}", e)))?;

    match payload.exp {
        None => Ok(None),
        Some(exp) => chrono::DateTime::from_timestamp(exp, 0).map(Some).ok_or_else(|| {
            ApiError::InvalidResponse("Invalid JWT expiration timestamp".to_string()).into()
        }),
    }
}

#[async_trait]
impl AuthApi for MccClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginSession> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/saas/public/core/v3/login", self.login_url);
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST
        ) {
            return Err(ApiError::Unauthorized.into());
        }

        let login: LoginResponse = parse_response(response).await?;
        if let Some(product) = login.products.first() {
            debug!(
                "Login advertised product {} at {:?}",
                product.name, product.base_api_url
            );
        }

        Ok(login.user_info.into())
    }

    async fn generate_jwt(&self, session: &LoginSession) -> Result<JwtToken> {
        self.rate_limiter.until_ready().await;

        #[derive(Deserialize)]
        struct TokenResponse {
            jwt_token: String,
        }

        let url = format!("{}/identity-service/api/v1/jwt/Token", self.pod_api_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("client_id", JWT_CLIENT_ID),
                ("nonce", JWT_NONCE),
                ("access_code", ""),
            ])
            .header("IDS-SESSION-ID", &session.session_id)
            .header("Cookie", format!("USER_SESSION={}", session.session_id))
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized.into());
        }

        let token: TokenResponse = parse_response(response).await?;
        let expires_at = jwt_expiry(&token.jwt_token)?.unwrap_or_else(|| {
            Utc::now() + chrono::Duration::minutes(DEFAULT_JWT_LIFETIME_MINUTES)
        });

        Ok(JwtToken {
            token: token.jwt_token,
            expires_at,
        })
    }
}

#[async_trait]
impl CatalogApi for MccClient {
    async fn search_assets(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let body = serde_json::to_value(request)?;
        self.request(
            Method::POST,
            "/data360/search/v1/assets",
            &[
                ("knowledgeQuery", "*".to_string()),
                ("segments", "all".to_string()),
            ],
            Some(&body),
        )
        .await
    }

    async fn run_catalog_source_job(
        &self,
        catalog_source_id: &str,
        capabilities: &[Capability],
    ) -> Result<JobStarted> {
        let body = serde_json::to_value(RunJobRequest {
            capabilities: capabilities
                .iter()
                .map(|c| c.display_name().to_string())
                .collect(),
        })?;
        let path = format!("/data360/catalog/v1/catalogsources/{}/jobs", catalog_source_id);
        let started: Option<JobStarted> = self.request(Method::POST, &path, &[], Some(&body)).await?;
        Ok(started.unwrap_or_default())
    }

    async fn get_job_status(&self, job_id: &str) -> Result<JobStatus> {
        let path = format!("/data360/observable/v1/jobs/{}", job_id);
        self.request(Method::GET, &path, &[], None).await
    }
}

#[async_trait]
impl ClassificationApi for MccClient {
    async fn list_classifications_page(
        &self,
        pagination: &PaginationParams,
    ) -> Result<ClassificationPage> {
        let page: Option<ClassificationPage> = self
            .request(
                Method::GET,
                CLASSIFICATIONS_PATH,
                &pagination.to_query_params(),
                None,
            )
            .await?;
        Ok(page.unwrap_or_default())
    }

    async fn get_classification(&self, id: &str) -> Result<Classification> {
        let path = format!("{}/{}", CLASSIFICATIONS_PATH, id);
        self.request(Method::GET, &path, &[], None).await
    }

    async fn create_classification(&self, record: &Classification) -> Result<()> {
        let body = serde_json::to_value(record)?;
        let _: Value = self
            .request(Method::POST, CLASSIFICATIONS_PATH, &[], Some(&body))
            .await?;
        Ok(())
    }

    async fn update_classification(&self, id: &str, record: &Classification) -> Result<()> {
        let body = serde_json::to_value(record)?;
        let path = format!("{}/{}", CLASSIFICATIONS_PATH, id);
        let _: Value = self.request(Method::PUT, &path, &[], Some(&body)).await?;
        Ok(())
    }
}
