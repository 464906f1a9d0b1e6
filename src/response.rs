//! Classification of SES query API responses.

use bytes::Bytes;
use http::StatusCode;
use log::debug;
use quick_xml::de;
use serde::Deserialize;

/// Status codes SES uses for accepted requests.
const SUCCESS_STATUSES: &[u16] = &[200, 201, 202, 204];

/// Structured rejection returned by the service.
///
/// Indicates a signing, permission, or validation problem; retrying
/// without changing the request will not help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// The `Type` element, e.g. `Sender`.
    pub error_type: String,
    /// The `Code` element, e.g. `InvalidParameterValue`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Request id from the envelope root.
    pub request_id: String,
    /// HTTP status the error arrived with.
    pub status: StatusCode,
}

/// The uniform result of one dispatched request.
///
/// Every dispatch produces exactly one of these; expected failures are
/// values here, never panics or propagated errors, so callers cannot
/// mistake an absent error for a populated one.
#[derive(Debug)]
pub enum Outcome {
    /// The exchange completed and the body carried no service error.
    ///
    /// The status may still be outside the success set when the body
    /// held no `Error` element to interpret.
    Success {
        /// HTTP status of the exchange.
        status: StatusCode,
        /// Parsed response document.
        body: String,
    },
    /// The request never completed an HTTP exchange (connection, DNS,
    /// TLS, timeout). Always worth a caller retry.
    Transport {
        /// Description of the failure.
        message: String,
        /// The underlying transport error.
        source: anyhow::Error,
    },
    /// The service rejected the request.
    Service(ServiceError),
    /// The exchange completed but the body did not parse as the
    /// expected XML envelope.
    Malformed {
        /// HTTP status of the exchange.
        status: StatusCode,
        /// Description of what failed to parse.
        message: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ResponseEnvelope {
    error: Option<ErrorElement>,
    request_id: Option<String>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ResponseMetadata {
    request_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorElement {
    #[serde(rename = "Type")]
    error_type: String,
    code: String,
    message: String,
}

/// Classify a completed HTTP exchange into an [`Outcome`].
///
/// A non-success status whose body carries an `Error` element becomes
/// [`Outcome::Service`] and the raw body is dropped; it is fully
/// represented by the structured error. Anything that fails to parse is
/// surfaced as [`Outcome::Malformed`] rather than passed along as a
/// success.
pub fn interpret(status: StatusCode, body: Bytes) -> Outcome {
    let text = match std::str::from_utf8(&body) {
        Ok(v) => v,
        Err(e) => {
            return Outcome::Malformed {
                status,
                message: format!("response body is not valid utf-8: {e}"),
            }
        }
    };

    // 204 carries no body at all.
    if text.trim().is_empty() {
        if SUCCESS_STATUSES.contains(&status.as_u16()) {
            return Outcome::Success {
                status,
                body: String::new(),
            };
        }
        return Outcome::Malformed {
            status,
            message: "response body is empty".to_string(),
        };
    }

    let envelope: ResponseEnvelope = match de::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            return Outcome::Malformed {
                status,
                message: format!("response body is not the expected xml envelope: {e}"),
            }
        }
    };

    if !SUCCESS_STATUSES.contains(&status.as_u16()) {
        if let Some(error) = envelope.error {
            let request_id = envelope
                .request_id
                .or(envelope.response_metadata.and_then(|m| m.request_id))
                .unwrap_or_default();
            debug!(
                "service rejected request: code={} request_id={}",
                error.code, request_id
            );

            return Outcome::Service(ServiceError {
                error_type: error.error_type,
                code: error.code,
                message: error.message,
                request_id,
                status,
            });
        }
    }

    Outcome::Success {
        status,
        body: text.to_string(),
    }
}
