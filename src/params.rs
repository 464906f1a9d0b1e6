//! Request parameter collection and canonical query serialization.

use std::collections::BTreeMap;

use percent_encoding::utf8_percent_encode;

use crate::constants::STRICT_QUERY_ENCODE_SET;

/// Value stored under one parameter name.
///
/// The shape is chosen at the call site: [`RequestParams::set`] stores a
/// `Single`, repeated [`RequestParams::append`] calls grow a `Multiple`.
/// There is no implicit coercion on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// One value.
    Single(String),
    /// An ordered list of values accumulated under one name.
    Multiple(Vec<String>),
}

/// Request parameters accumulated before signing.
///
/// Keys are kept sorted bytewise. The signature is computed over the
/// sorted serialization, so this ordering is part of the wire contract,
/// not a cosmetic choice.
///
/// A `RequestParams` is request-scoped: it is owned by one in-flight
/// request and is not meant to be shared across concurrent calls.
///
/// No validation is performed on names or values; empty strings and
/// duplicate values are accepted as-is.
#[derive(Debug, Default, Clone)]
pub struct RequestParams {
    inner: BTreeMap<String, ParamValue>,
}

impl RequestParams {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any existing value under `key`.
    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        self.inner
            .insert(key.to_string(), ParamValue::Single(value.to_string()));
        self
    }

    /// Append a value under `key` without replacing what is there.
    ///
    /// A `Single` becomes a two-element `Multiple`; an absent key stores
    /// a `Single`.
    pub fn append(&mut self, key: &str, value: &str) -> &mut Self {
        let stored = match self.inner.remove(key) {
            None => ParamValue::Single(value.to_string()),
            Some(ParamValue::Single(existing)) => {
                ParamValue::Multiple(vec![existing, value.to_string()])
            }
            Some(ParamValue::Multiple(mut values)) => {
                values.push(value.to_string());
                ParamValue::Multiple(values)
            }
        };
        self.inner.insert(key.to_string(), stored);
        self
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.inner.get(key)
    }

    /// Whether no parameter has been set.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Serialize into the canonical query string.
    ///
    /// Keys come out in bytewise order; names and values are encoded
    /// with the strict RFC 3986 unreserved set (space is `%20`). A
    /// `Multiple` serializes as repeated `key=value` pairs in insertion
    /// order under its sorted key.
    ///
    /// SES list parameters conventionally arrive as indexed names
    /// (`Destinations.member.1`, ...) set by the caller; repeated-pair
    /// output only appears when `append` was used on one name.
    pub fn canonical_query(&self) -> String {
        let mut pairs = Vec::with_capacity(self.inner.len());
        for (key, value) in self.inner.iter() {
            match value {
                ParamValue::Single(v) => pairs.push(encode_pair(key, v)),
                ParamValue::Multiple(vs) => {
                    pairs.extend(vs.iter().map(|v| encode_pair(key, v)))
                }
            }
        }
        pairs.join("&")
    }
}

fn encode_pair(key: &str, value: &str) -> String {
    format!(
        "{}={}",
        utf8_percent_encode(key, &STRICT_QUERY_ENCODE_SET),
        utf8_percent_encode(value, &STRICT_QUERY_ENCODE_SET)
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_set_replaces_existing_value() {
        let mut params = RequestParams::new();
        params.set("X", "a");
        params.set("X", "b");

        assert_eq!(params.get("X"), Some(&ParamValue::Single("b".into())));
    }

    #[test]
    fn test_append_accumulates_ordered_list() {
        let mut params = RequestParams::new();
        params.set("X", "a");
        params.append("X", "b");

        assert_eq!(
            params.get("X"),
            Some(&ParamValue::Multiple(vec!["a".into(), "b".into()]))
        );

        params.append("X", "c");
        assert_eq!(
            params.get("X"),
            Some(&ParamValue::Multiple(vec![
                "a".into(),
                "b".into(),
                "c".into()
            ]))
        );
    }

    #[test]
    fn test_append_on_absent_key_stores_single() {
        let mut params = RequestParams::new();
        params.append("X", "a");

        assert_eq!(params.get("X"), Some(&ParamValue::Single("a".into())));
    }

    #[test]
    fn test_canonical_query_is_insertion_order_invariant() {
        let mut a = RequestParams::new();
        a.set("Action", "SendEmail");
        a.set("Version", "2010-12-01");
        a.set("Source", "no-reply@example.com");

        let mut b = RequestParams::new();
        b.set("Source", "no-reply@example.com");
        b.set("Action", "SendEmail");
        b.set("Version", "2010-12-01");

        assert_eq!(a.canonical_query(), b.canonical_query());
        assert_eq!(
            a.canonical_query(),
            "Action=SendEmail&Source=no-reply%40example.com&Version=2010-12-01"
        );
    }

    #[test]
    fn test_canonical_query_uses_strict_rfc3986_encoding() {
        let mut params = RequestParams::new();
        params.set("Message.Subject.Data", "hello world & more~");

        assert_eq!(
            params.canonical_query(),
            "Message.Subject.Data=hello%20world%20%26%20more~"
        );
    }

    #[test]
    fn test_canonical_query_repeats_multiple_values() {
        let mut params = RequestParams::new();
        params.set("B", "2");
        params.set("A", "x");
        params.append("A", "y");

        assert_eq!(params.canonical_query(), "A=x&A=y&B=2");
    }

    #[test]
    fn test_empty_values_are_kept() {
        let mut params = RequestParams::new();
        params.set("Flag", "");

        assert_eq!(params.canonical_query(), "Flag=");
    }
}
