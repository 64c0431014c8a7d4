use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{ApiError, Body, Transport};
use crate::config::Config;

/// [`Transport`] over HTTP, bound to one base URL.
///
/// Every request carries JSON `Accept`/`Content-Type` headers and no
/// credentials.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

/// Shape of the server's error replies on non-success statuses.
#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl HttpClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Body, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorMessage>(&text)
                .map(|err| err.message)
                .unwrap_or(text);
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Body::from_reply(text, content_type.as_deref()))
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, path: &str) -> Result<Body, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        self.send(self.client.get(url)).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Body, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        self.send(self.client.post(url).json(&body)).await
    }

    async fn put(&self, path: &str) -> Result<Body, ApiError> {
        let url = self.url(path);
        debug!(%url, "PUT");
        self.send(self.client.put(url)).await
    }
}
