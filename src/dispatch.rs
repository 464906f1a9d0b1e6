//! Authenticated dispatch of SES query API requests.

use std::sync::Arc;

use bytes::Bytes;
use http::header;
use http::HeaderValue;
use http::Method;
use log::debug;

use crate::constants::CONTENT_TYPE_FORM;
use crate::constants::SERVICE;
use crate::constants::X_AMZ_DATE;
use crate::credential::Credential;
use crate::error::Result;
use crate::http::HttpSend;
use crate::http::ReqwestHttpSend;
use crate::http::TransportConfig;
use crate::params::RequestParams;
use crate::response::interpret;
use crate::response::Outcome;
use crate::sign;
use crate::sign::SigningContext;
use crate::time::now;
use crate::time::DateTime;

/// Dispatch context for SES query API calls.
///
/// Holds everything that survives across requests: endpoint host,
/// region, credential, and the transport. Per-request state lives in
/// [`SesRequest`].
#[derive(Debug)]
pub struct SesClient {
    host: String,
    region: String,
    credential: Credential,
    http: Arc<dyn HttpSend>,
}

impl SesClient {
    /// Create a client with its own transport built from `config`.
    pub fn new(
        host: &str,
        region: &str,
        credential: Credential,
        config: &TransportConfig,
    ) -> Result<Self> {
        Ok(Self::with_http_send(
            host,
            region,
            credential,
            ReqwestHttpSend::from_config(config)?,
        ))
    }

    /// Create a client over a caller-supplied transport.
    ///
    /// Useful to share one connection pool across several clients, or
    /// to stub the transport in tests.
    pub fn with_http_send(
        host: &str,
        region: &str,
        credential: Credential,
        http: impl HttpSend,
    ) -> Self {
        Self {
            host: host.to_string(),
            region: region.to_string(),
            credential,
            http: Arc::new(http),
        }
    }

    /// The endpoint host requests are sent to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The region requests are signed for.
    pub fn region(&self) -> &str {
        &self.region
    }
}

/// One SES query API request: a verb plus accumulated parameters.
///
/// Request-scoped. Construct a fresh one per call and do not share it
/// across concurrently in-flight requests.
#[derive(Debug)]
pub struct SesRequest {
    verb: Method,
    params: RequestParams,
}

impl SesRequest {
    /// Create a request for the given HTTP verb and SES action.
    pub fn new(verb: Method, action: &str) -> Self {
        let mut params = RequestParams::new();
        params.set("Action", action);

        Self { verb, params }
    }

    /// Set a parameter, replacing any existing value.
    pub fn set_param(&mut self, key: &str, value: &str) -> &mut Self {
        self.params.set(key, value);
        self
    }

    /// Append a value under `key`, accumulating an ordered list.
    pub fn append_param(&mut self, key: &str, value: &str) -> &mut Self {
        self.params.append(key, value);
        self
    }

    /// The accumulated parameters.
    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    /// Sign and dispatch this request, returning a uniform outcome.
    ///
    /// Transport failures are captured as [`Outcome::Transport`] rather
    /// than propagated; `Err` is reserved for requests that cannot be
    /// constructed at all. No retries are performed.
    pub async fn send(&self, client: &SesClient) -> Result<Outcome> {
        self.send_at(client, now()).await
    }

    /// Dispatch with an explicit signing time.
    ///
    /// We should always take current time to sign requests. Only use
    /// this function for testing.
    async fn send_at(&self, client: &SesClient, time: DateTime) -> Result<Outcome> {
        let query = self.params.canonical_query();
        let content_bearing = sign::is_content_bearing(&self.params);
        let ctx = SigningContext::new(&client.region, SERVICE, time);

        let creq = sign::canonical_request(
            self.verb.as_str(),
            &client.host,
            &query,
            &ctx.timestamp,
            content_bearing,
        )?;
        debug!("calculated canonical request: {creq}");

        let string_to_sign = sign::string_to_sign(&creq, &ctx)?;
        let signing_key = sign::generate_signing_key(
            &client.credential.secret_access_key,
            &ctx.date,
            &ctx.region,
            &ctx.service,
        );
        let signature = sign::sign_string(&signing_key, &string_to_sign);

        let mut authorization = HeaderValue::from_str(&sign::authorization_header(
            &client.credential.access_key_id,
            &ctx,
            sign::signed_headers(content_bearing),
            &signature,
        ))?;
        authorization.set_sensitive(true);

        // GET and DELETE carry the query on the URL; POST submits it as
        // the form body.
        let url = if self.verb == Method::POST || query.is_empty() {
            format!("https://{}/", client.host)
        } else {
            format!("https://{}/?{}", client.host, query)
        };
        let body = if self.verb == Method::POST {
            Bytes::from(query)
        } else {
            Bytes::new()
        };

        let mut builder = http::Request::builder()
            .method(self.verb.clone())
            .uri(&url)
            .header(header::HOST, &client.host)
            .header(X_AMZ_DATE, &ctx.timestamp)
            .header(header::AUTHORIZATION, authorization);
        if content_bearing {
            builder = builder.header(header::CONTENT_TYPE, CONTENT_TYPE_FORM);
        }
        let req = builder.body(body)?;

        match client.http.http_send(req).await {
            Ok(resp) => {
                let (parts, body) = resp.into_parts();
                Ok(interpret(parts.status, body))
            }
            Err(e) => Ok(Outcome::Transport {
                message: e.to_string(),
                source: e,
            }),
        }
    }
}
