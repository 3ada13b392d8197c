//! HTTP client for the Marine-Axis REST API
//!
//! Every guarded request carries the stored access token. A 401 on a request
//! that has not been retried triggers one token refresh and one replay; if the
//! refresh fails the session is cleared and a redirect-to-login event is
//! published.

use reqwest::{Client, Method, Url};
use serde_json::{json, Value};
use std::sync::Arc;

use super::envelope;
use crate::auth::guard::LOGIN_PATH;
use crate::auth::models::{LoginRequest, LoginResponse, TokenPair, User, UserRole};
use crate::auth::session::SessionManager;
use crate::config::ApiConfig;
use crate::error::{ApiError, Error, Result};
use crate::events::{Event, EventBus};

pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const REFRESH_ENDPOINT: &str = "/auth/refresh";
pub const LOGOUT_ENDPOINT: &str = "/auth/logout";
pub const DASHBOARD_STATS_ENDPOINT: &str = "/dashboard/stats";

/// A request description that can be replayed after a token refresh
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Set once the request has been replayed after a refresh
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn into_retry(mut self) -> Self {
        self.retried = true;
        self
    }
}

/// API client shared by every resource
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionManager>,
    events: EventBus,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionManager>, events: EventBus) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| Error::Config(format!("Invalid api.base_url '{}': {}", base_url, e)))?;

        Ok(Self {
            http,
            base_url,
            session,
            events,
        })
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path plus query pairs
    pub fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url =
            Url::parse(&raw).map_err(|e| Error::Config(format!("Invalid URL '{}': {}", raw, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }

    /// Send a guarded request, refreshing the session once on 401
    pub async fn send(&self, request: ApiRequest) -> Result<Value> {
        let token = self.session.access_token().await?;

        match self.execute(&request, token.as_deref()).await {
            Err(err) if err.is_unauthorized() && !request.retried => {
                tracing::debug!("401 from {}, attempting token refresh", err.url);
                let fresh = self.refresh_after(token.as_deref()).await?;
                let retry = request.into_retry();
                self.execute(&retry, Some(&fresh)).await.map_err(Error::from)
            }
            other => other.map_err(Error::from),
        }
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        self.send(ApiRequest::get(path).query(query.iter().cloned()))
            .await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.send(ApiRequest::post(path).json(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value> {
        self.send(ApiRequest::put(path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Perform one HTTP exchange; no refresh handling
    async fn execute(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> std::result::Result<Value, ApiError> {
        let url = self
            .url_for(&request.path, &request.query)
            .map_err(|e| ApiError::network(request.path.clone(), e))?;
        let url_str = url.to_string();

        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(url_str.clone(), e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::network(url_str.clone(), e))?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if status.is_success() {
            Ok(body)
        } else {
            tracing::debug!("{} {} -> {}", request.method, url_str, status);
            Err(ApiError::from_status(
                status.as_u16(),
                url_str,
                envelope::server_message(&body),
            ))
        }
    }

    /// Obtain a fresh access token after `stale` was rejected
    async fn refresh_after(&self, stale: Option<&str>) -> Result<String> {
        let _guard = self.session.refresh_lock().await;

        // Another request may have refreshed while this one waited for the lock
        if let Some(current) = self.session.access_token().await? {
            if Some(current.as_str()) != stale && self.session.is_authenticated().await {
                tracing::debug!("Token already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        self.session.mark_refreshing().await;

        let Some(refresh_token) = self.session.refresh_token().await? else {
            tracing::warn!("No refresh token stored");
            return self.expire_session().await;
        };

        let request = ApiRequest::post(REFRESH_ENDPOINT).json(json!({ "refreshToken": refresh_token }));
        let refreshed = match self.execute(&request, None).await {
            Ok(body) => envelope::decode_item::<TokenPair>(body, REFRESH_ENDPOINT),
            Err(e) => Err(e),
        };

        match refreshed {
            Ok(tokens) => {
                let next_refresh = tokens.refresh_token.as_deref().unwrap_or(&refresh_token);
                self.session
                    .set_tokens(&tokens.access_token, next_refresh)
                    .await?;
                tracing::info!("Session refreshed");
                self.events.publish(Event::SessionRefreshed);
                Ok(tokens.access_token)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                self.expire_session().await
            }
        }
    }

    async fn expire_session(&self) -> Result<String> {
        self.session.clear_tokens().await?;
        self.events.publish(Event::RedirectToLogin {
            path: LOGIN_PATH.to_string(),
        });
        Err(Error::SessionExpired)
    }

    /// Sign in and persist the returned session
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let request = ApiRequest::post(LOGIN_ENDPOINT).json(serde_json::to_value(&credentials)?);
        let body = self.execute(&request, None).await?;
        let response: LoginResponse = envelope::decode_item(body, LOGIN_ENDPOINT)?;

        let refresh_token = response.tokens.refresh_token.clone().unwrap_or_default();
        self.session
            .set_tokens(&response.tokens.access_token, &refresh_token)
            .await?;

        let user = match response.user {
            Some(user) => user,
            None => self.user_from_token(&response.tokens.access_token, email)?,
        };
        self.session.set_user(&user).await?;

        tracing::info!("Signed in as {} ({})", user.display_name(), user.role);
        Ok(user)
    }

    fn user_from_token(&self, token: &str, email: &str) -> Result<User> {
        let claims = crate::auth::decode_claims(token)?;
        Ok(User {
            id: claims.subject().unwrap_or_default().to_string(),
            name: None,
            email: claims.email.or_else(|| Some(email.to_string())),
            role: claims.role.unwrap_or(UserRole::Other("unknown".to_string())),
        })
    }

    /// Sign out; the local session is cleared even if the server call fails
    pub async fn logout(&self) -> Result<()> {
        if let Some(token) = self.session.access_token().await? {
            if let Err(e) = self
                .execute(&ApiRequest::post(LOGOUT_ENDPOINT), Some(&token))
                .await
            {
                tracing::debug!("Server-side logout failed: {}", e);
            }
        }
        self.session.clear_tokens().await?;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Dashboard analytics counters
    pub async fn dashboard_stats(&self) -> Result<Value> {
        let body = self.get(DASHBOARD_STATS_ENDPOINT, &[]).await?;
        Ok(envelope::unwrap_data(body, DASHBOARD_STATS_ENDPOINT)?)
    }
}
