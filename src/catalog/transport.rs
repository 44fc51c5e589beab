//! Transport and delay seams, with the reqwest and tokio implementations.

use super::CatalogError;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

/// Status and body of one provider response.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one GraphQL request body to the provider.
pub trait Transport {
    fn post_json(&self, body: &Value) -> impl Future<Output = Result<RawResponse, CatalogError>>;
}

/// Waits between rate-limited attempts.
pub trait Delay {
    fn wait(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Real timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// reqwest client bound to one endpoint.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, user_agent: &str) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Transport for HttpTransport {
    async fn post_json(&self, body: &Value) -> Result<RawResponse, CatalogError> {
        let resp = self
            .client
            .post(&self.url)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(RawResponse { status, body })
    }
}
