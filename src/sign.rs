//! SigV4 canonical request construction and signature computation.
//!
//! - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)

use std::fmt::Write;

use log::debug;

use crate::constants::ALGORITHM;
use crate::constants::AWS4_REQUEST;
use crate::constants::CONTENT_BEARING_ACTIONS;
use crate::constants::CONTENT_TYPE_FORM;
use crate::constants::X_AMZ_DATE;
use crate::error::Result;
use crate::hash::hex_hmac_sha256;
use crate::hash::hex_sha256;
use crate::hash::hmac_sha256;
use crate::params::ParamValue;
use crate::params::RequestParams;
use crate::time::format_date;
use crate::time::format_iso8601;
use crate::time::DateTime;

/// Everything one signature is scoped to.
///
/// Constructed fresh per request. A key derived for this context is
/// valid for exactly one (date, region, service) triple and must not be
/// reused across a different one.
#[derive(Debug, Clone)]
pub struct SigningContext {
    /// Date in `YYYYMMDD` form.
    pub date: String,
    /// Timestamp in `YYYYMMDDTHHMMSSZ` form, same instant as `date`.
    pub timestamp: String,
    /// Region the request is sent to.
    pub region: String,
    /// Service name in the credential scope.
    pub service: String,
}

impl SigningContext {
    /// Create a signing context for the given region, service and time.
    pub fn new(region: &str, service: &str, time: DateTime) -> Self {
        Self {
            date: format_date(time),
            timestamp: format_iso8601(time),
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    /// Credential scope: `20150830/us-east-1/email/aws4_request`.
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.date, self.region, self.service, AWS4_REQUEST
        )
    }
}

/// Whether the `Action` parameter names a form-body operation.
pub fn is_content_bearing(params: &RequestParams) -> bool {
    matches!(
        params.get("Action"),
        Some(ParamValue::Single(action)) if CONTENT_BEARING_ACTIONS.contains(&action.as_str())
    )
}

/// Semicolon-joined signed header names, in canonical order.
pub fn signed_headers(content_bearing: bool) -> &'static str {
    if content_bearing {
        "content-type;host;x-amz-date"
    } else {
        "host;x-amz-date"
    }
}

/// Build the canonical request string.
///
/// The SES query API always targets `/`, signs `host` and `x-amz-date`
/// (preceded by `content-type` for form-body actions), and hashes the
/// encoded query string as the payload for every verb. Field order and
/// the single `\n` separators are fixed by the standard; identical
/// inputs must produce byte-identical output.
pub fn canonical_request(
    verb: &str,
    host: &str,
    query: &str,
    timestamp: &str,
    content_bearing: bool,
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    writeln!(f, "{verb}")?;
    writeln!(f, "/")?;
    writeln!(f, "{query}")?;
    if content_bearing {
        writeln!(f, "content-type:{CONTENT_TYPE_FORM}")?;
    }
    writeln!(f, "host:{host}")?;
    writeln!(f, "{X_AMZ_DATE}:{timestamp}")?;
    writeln!(f)?;
    writeln!(f, "{}", signed_headers(content_bearing))?;
    // No trailing newline after the payload hash.
    write!(f, "{}", hex_sha256(query.as_bytes()))?;

    Ok(f)
}

/// Build the string to sign from a canonical request.
///
/// StringToSign:
///
/// AWS4-HMAC-SHA256
/// 20150830T123600Z
/// 20150830/us-east-1/email/aws4_request
/// <hashed_canonical_request>
pub fn string_to_sign(canonical_request: &str, ctx: &SigningContext) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "{ALGORITHM}")?;
    writeln!(f, "{}", ctx.timestamp)?;
    writeln!(f, "{}", ctx.credential_scope())?;
    write!(f, "{}", hex_sha256(canonical_request.as_bytes()))?;

    debug!("calculated string to sign: {f}");
    Ok(f)
}

/// Derive the scoped signing key.
///
/// Each stage is HMAC-SHA256 over raw bytes, the previous output keying
/// the next: secret is prefixed with `AWS4`, then chained over date,
/// region, service, and the `aws4_request` terminator.
pub fn generate_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let secret = format!("AWS4{secret}");
    let sign_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());

    hmac_sha256(sign_service.as_slice(), AWS4_REQUEST.as_bytes())
}

/// Lowercase-hex signature of the string to sign under the derived key.
pub fn sign_string(signing_key: &[u8], string_to_sign: &str) -> String {
    hex_hmac_sha256(signing_key, string_to_sign.as_bytes())
}

/// Build the `Authorization` header value.
pub fn authorization_header(
    access_key_id: &str,
    ctx: &SigningContext,
    signed_headers: &str,
    signature: &str,
) -> String {
    format!(
        "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={}",
        access_key_id,
        ctx.credential_scope(),
        signed_headers,
        signature
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    // Test values from the published SigV4 worked example:
    // https://docs.aws.amazon.com/general/latest/gr/sigv4-calculate-signature.html
    const EXAMPLE_SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";
    const EXAMPLE_CANONICAL_REQUEST: &str = "GET\n/\nAction=ListUsers&Version=2010-05-08\ncontent-type:application/x-www-form-urlencoded; charset=utf-8\nhost:iam.amazonaws.com\nx-amz-date:20150830T123600Z\n\ncontent-type;host;x-amz-date\ne3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn example_time() -> DateTime {
        Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0)
            .single()
            .expect("in bounds")
    }

    #[test]
    fn test_signing_key_matches_published_example() {
        let key = generate_signing_key(EXAMPLE_SECRET, "20150830", "us-east-1", "iam");

        assert_eq!(
            hex::encode(key),
            "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
        );
    }

    #[test]
    fn test_signature_matches_published_example() {
        let ctx = SigningContext::new("us-east-1", "iam", example_time());

        let sts = string_to_sign(EXAMPLE_CANONICAL_REQUEST, &ctx).expect("must build");
        assert_eq!(
            sts,
            "AWS4-HMAC-SHA256\n\
             20150830T123600Z\n\
             20150830/us-east-1/iam/aws4_request\n\
             f536975d06c0309214f805bb90ccff089219ecd68b2577efef23edd43b7e1a59"
        );

        let key = generate_signing_key(EXAMPLE_SECRET, &ctx.date, &ctx.region, &ctx.service);
        assert_eq!(
            sign_string(&key, &sts),
            "5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
        );
    }

    #[test]
    fn test_signature_is_deterministic() {
        let ctx = SigningContext::new("eu-west-1", "email", example_time());

        let first = {
            let sts = string_to_sign("canonical", &ctx).expect("must build");
            let key = generate_signing_key("secret", &ctx.date, &ctx.region, &ctx.service);
            sign_string(&key, &sts)
        };

        for _ in 0..8 {
            let sts = string_to_sign("canonical", &ctx).expect("must build");
            let key = generate_signing_key("secret", &ctx.date, &ctx.region, &ctx.service);
            assert_eq!(sign_string(&key, &sts), first);
        }
    }

    #[test]
    fn test_canonical_request_for_content_bearing_action() {
        let creq = canonical_request(
            "POST",
            "email.us-east-1.amazonaws.com",
            "Action=SendEmail",
            "20150830T123600Z",
            true,
        )
        .expect("must build");

        assert_eq!(
            creq,
            format!(
                "POST\n\
                 /\n\
                 Action=SendEmail\n\
                 content-type:application/x-www-form-urlencoded\n\
                 host:email.us-east-1.amazonaws.com\n\
                 x-amz-date:20150830T123600Z\n\
                 \n\
                 content-type;host;x-amz-date\n\
                 {}",
                hex_sha256(b"Action=SendEmail")
            )
        );
    }

    #[test]
    fn test_canonical_request_without_content_type() {
        let creq = canonical_request(
            "GET",
            "email.us-east-1.amazonaws.com",
            "Action=GetSendQuota",
            "20150830T123600Z",
            false,
        )
        .expect("must build");

        assert!(!creq.contains("content-type"));
        assert!(creq.contains("\nhost;x-amz-date\n"));
        assert!(!creq.ends_with('\n'));
    }

    #[test]
    fn test_content_bearing_actions() {
        for (action, expected) in [
            ("SendEmail", true),
            ("SendRawEmail", true),
            ("GetSendQuota", false),
            ("DeleteVerifiedEmailAddress", false),
        ] {
            let mut params = RequestParams::new();
            params.set("Action", action);
            assert_eq!(is_content_bearing(&params), expected, "{action}");
        }
    }

    #[test]
    fn test_authorization_header_layout() {
        let ctx = SigningContext::new("us-east-1", "email", example_time());

        let value = authorization_header("AKIDEXAMPLE", &ctx, signed_headers(false), "deadbeef");
        assert_eq!(
            value,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/email/aws4_request, \
             SignedHeaders=host;x-amz-date, Signature=deadbeef"
        );
    }
}
