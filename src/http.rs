//! Transport seam for dispatching signed requests.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use reqwest::Client;

use crate::error::Error;
use crate::error::Result;

/// HttpSend issues the one HTTP exchange of a dispatched request.
///
/// One implementation may be shared across calls so the underlying
/// connections get reused; it must not hold per-request state. This
/// trait exists for the dispatcher, please don't use it as a general
/// http client.
#[async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send http request and return the response.
    async fn http_send(&self, req: http::Request<Bytes>) -> anyhow::Result<http::Response<Bytes>>;
}

/// Transport options applied once while building a client.
///
/// These replace process-wide mutable transport settings: every option
/// is fixed at construction so per-request behavior stays reproducible.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Timeout for the whole request round trip. `None` waits for the
    /// transport's own limits.
    pub timeout: Option<Duration>,
    /// Skip TLS certificate verification. Only for test endpoints.
    pub accept_invalid_certs: bool,
    /// Value of the `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            accept_invalid_certs: false,
            user_agent: format!("ses-request/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Default [`HttpSend`] implementation over a reqwest client.
#[derive(Debug, Default)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from explicit transport configuration.
    pub fn from_config(config: &TransportConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> anyhow::Result<http::Response<Bytes>> {
        let req = reqwest::Request::try_from(req)?;
        let resp: http::Response<_> = self.client.execute(req).await?.into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body).await.map(|buf| buf.to_bytes())?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
