//! HTTP client for network-based API calls

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiErrorBody;

use crate::{ClientConfig, ClientError, ClientResult};

/// Per-request context: bearer token and the message used when the
/// backend rejects the call without one of its own.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub token: Option<&'a str>,
    pub fallback: &'a str,
}

impl<'a> RequestContext<'a> {
    pub fn new(token: Option<&'a str>, fallback: &'a str) -> Self {
        Self { token, fallback }
    }

    /// Context for unauthenticated endpoints (login, register)
    pub fn anonymous(fallback: &'a str) -> Self {
        Self {
            token: None,
            fallback,
        }
    }
}

/// HTTP client trait
///
/// Services are generic over this so policy checks can be tested against a
/// recording fake without a server.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        ctx: RequestContext<'_>,
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync;

    async fn get<T: DeserializeOwned>(&self, path: &str, ctx: RequestContext<'_>) -> ClientResult<T> {
        self.send::<T, ()>(Method::GET, path, ctx, None).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        ctx: RequestContext<'_>,
        body: &B,
    ) -> ClientResult<T> {
        self.send(Method::POST, path, ctx, Some(body)).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str, ctx: RequestContext<'_>) -> ClientResult<T> {
        self.send::<T, ()>(Method::POST, path, ctx, None).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        ctx: RequestContext<'_>,
        body: &B,
    ) -> ClientResult<T> {
        self.send(Method::PUT, path, ctx, Some(body)).await
    }

    async fn put_empty<T: DeserializeOwned>(&self, path: &str, ctx: RequestContext<'_>) -> ClientResult<T> {
        self.send::<T, ()>(Method::PUT, path, ctx, None).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        ctx: RequestContext<'_>,
        body: &B,
    ) -> ClientResult<T> {
        self.send(Method::PATCH, path, ctx, Some(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str, ctx: RequestContext<'_>) -> ClientResult<T> {
        self.send::<T, ()>(Method::DELETE, path, ctx, None).await
    }
}

/// Network HTTP client
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
}

impl NetworkHttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url is required".into()));
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL all paths are joined onto
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
        fallback: &str,
    ) -> ClientResult<T> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let details = ApiErrorBody::parse(&text);
            let message = details
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string());
            tracing::debug!(status = status.as_u16(), %message, "API request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
                details,
            });
        }
        // Some endpoints answer 200/204 with no body
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(body).map_err(|e| {
            ClientError::InvalidResponse(format!("{fallback}: {e}"))
        })
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        ctx: RequestContext<'_>,
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = self.url(path);
        tracing::debug!(%method, %url, "API request");
        let mut req = self.client.request(method, &url);
        if let Some(token) = ctx.token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let response = req.send().await?;
        Self::handle_response(response, ctx.fallback).await
    }
}
