use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

/// SigV4 algorithm identifier.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Service name SES carries in the credential scope.
pub const SERVICE: &str = "email";

/// Terminator of the credential scope and of the key derivation chain.
pub const AWS4_REQUEST: &str = "aws4_request";

// Headers used by the SES query API.
pub const X_AMZ_DATE: &str = "x-amz-date";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// Actions whose payload is the encoded query string submitted as a form
/// body. These sign `content-type` as the first canonical header.
pub const CONTENT_BEARING_ACTIONS: &[&str] = &["SendEmail", "SendRawEmail"];

/// AsciiSet for strict RFC 3986 query encoding.
///
/// Every byte is encoded except the unreserved characters 'A'-'Z',
/// 'a'-'z', '0'-'9', '-', '.', '_', and '~'. Space encodes to `%20`,
/// never `+`.
pub static STRICT_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
