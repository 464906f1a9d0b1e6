//! Signing and dispatch for the AWS Simple Email Service query API.
//!
//! This crate covers the request pipeline between a caller-built
//! parameter map and a classified response: canonical request
//! construction, SigV4 key derivation and signing, the one HTTP
//! exchange, and service-error extraction. Higher-level send-email
//! facades, credential loading, and retry policies live with the
//! caller.
//!
//! ## Overview
//!
//! A request flows through four stages:
//!
//! 1. [`RequestParams`] accumulates parameters and serializes them into
//!    the sorted, strictly percent-encoded canonical query string.
//! 2. [`sign`] turns verb, host, query, and timestamp into the
//!    canonical request, derives the scoped signing key, and computes
//!    the signature.
//! 3. [`SesRequest::send`] assembles the authenticated headers and
//!    issues the HTTP call through an [`HttpSend`] transport.
//! 4. [`Outcome`] reports the result: success, transport failure,
//!    structured service error, or malformed response body.
//!
//! All signing artifacts are request-scoped and deterministic; the only
//! side effect is the network call itself.
//!
//! ## Example
//!
//! ```no_run
//! use http::Method;
//! use ses_request::{Credential, Outcome, SesClient, SesRequest, TransportConfig};
//!
//! #[tokio::main]
//! async fn main() -> ses_request::Result<()> {
//!     let client = SesClient::new(
//!         "email.us-east-1.amazonaws.com",
//!         "us-east-1",
//!         Credential::new("access_key_id", "secret_access_key"),
//!         &TransportConfig::default(),
//!     )?;
//!
//!     let mut req = SesRequest::new(Method::POST, "SendEmail");
//!     req.set_param("Source", "no-reply@example.com")
//!         .set_param("Destination.ToAddresses.member.1", "someone@example.com")
//!         .set_param("Message.Subject.Data", "hello");
//!
//!     match req.send(&client).await? {
//!         Outcome::Success { status, .. } => println!("accepted: {status}"),
//!         Outcome::Service(err) => println!("rejected: {} ({})", err.code, err.request_id),
//!         Outcome::Transport { message, .. } => println!("transport failed: {message}"),
//!         Outcome::Malformed { status, message } => {
//!             println!("unexpected body on {status}: {message}")
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;
pub mod hash;
pub mod sign;
pub mod time;

mod credential;
pub use credential::Credential;

mod error;
pub use error::{Error, ErrorKind, Result};

mod params;
pub use params::{ParamValue, RequestParams};

mod http;
pub use crate::http::{HttpSend, ReqwestHttpSend, TransportConfig};

mod dispatch;
pub use dispatch::{SesClient, SesRequest};

mod response;
pub use response::{interpret, Outcome, ServiceError};
