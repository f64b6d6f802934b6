//! Per-request configuration and its builder.
//!
//! # Design
//! `RequestOptions` is assembled once through `RequestOptionsBuilder` and is
//! read-only afterwards; the client only ever borrows it. Query and body
//! parameters are kept as ordered `(key, value)` lists so the encoded output
//! follows the order the caller supplied them in.
//!
//! Encoding is best effort: a pair that cannot be represented in the
//! configured charset is dropped from the output (with a warning) instead of
//! failing the whole request.

use encoding_rs::Encoding;
use tracing::warn;

use crate::method::RequestMethod;

/// Endpoint, verb and parameters for a single request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    charset: &'static Encoding,
    endpoint: Option<String>,
    method: Option<RequestMethod>,
    query_params: Vec<(String, String)>,
    request_params: Vec<(String, String)>,
}

impl RequestOptions {
    /// Start building options whose parameters are percent-encoded in `charset`.
    pub fn builder(charset: &'static Encoding) -> RequestOptionsBuilder {
        RequestOptionsBuilder {
            options: RequestOptions {
                charset,
                endpoint: None,
                method: None,
                query_params: Vec::new(),
                request_params: Vec::new(),
            },
        }
    }

    pub fn charset(&self) -> &'static Encoding {
        self.charset
    }

    /// The effective URL: the endpoint followed by the encoded query string.
    ///
    /// Returns the endpoint untouched when there is nothing to append, and
    /// `None` when no endpoint was set. Pairs with an empty key are skipped;
    /// empty values are kept (`key=`).
    pub fn endpoint(&self) -> Option<String> {
        let endpoint = self.endpoint.as_deref()?;
        let query = encode_pairs(
            self.query_params.iter().filter(|(key, _)| !key.is_empty()),
            self.charset,
        );
        if query.is_empty() {
            Some(endpoint.to_string())
        } else {
            Some(format!("{endpoint}?{query}"))
        }
    }

    /// The endpoint exactly as it was given to the builder.
    pub fn raw_endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn method(&self) -> RequestMethod {
        self.method.unwrap_or_default()
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    pub fn request_params(&self) -> &[(String, String)] {
        &self.request_params
    }

    /// Form-encoded body parameters (`k1=v1&k2=v2`), or `""` when none are set.
    pub fn request_params_string(&self) -> String {
        encode_pairs(self.request_params.iter(), self.charset)
    }
}

/// Chained builder for `RequestOptions`.
#[derive(Debug, Clone)]
pub struct RequestOptionsBuilder {
    options: RequestOptions,
}

impl RequestOptionsBuilder {
    pub fn set_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.options.endpoint = Some(endpoint.into());
        self
    }

    pub fn set_request_method(mut self, method: RequestMethod) -> Self {
        self.options.method = Some(method);
        self
    }

    /// Replace the query parameters. Iteration order is preserved.
    pub fn with_query_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options.query_params = collect_pairs(params);
        self
    }

    /// Replace the body parameters. Iteration order is preserved.
    pub fn with_request_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.options.request_params = collect_pairs(params);
        self
    }

    pub fn build(self) -> RequestOptions {
        self.options
    }
}

fn collect_pairs<I, K, V>(params: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    params
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Join `key=value` pairs with `&`, dropping any pair that fails to encode.
fn encode_pairs<'a, I>(pairs: I, charset: &'static Encoding) -> String
where
    I: Iterator<Item = &'a (String, String)>,
{
    let mut out = String::new();
    for (key, value) in pairs {
        let (Some(key_enc), Some(value_enc)) =
            (encode_component(key, charset), encode_component(value, charset))
        else {
            warn!(key = %key, charset = charset.name(), "dropping parameter not representable in charset");
            continue;
        };
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&key_enc);
        out.push('=');
        out.push_str(&value_enc);
    }
    out
}

/// `application/x-www-form-urlencoded` escaping of `s` as encoded by `charset`.
///
/// Escaped bytes come from the charset's output encoding, so UTF-16 and
/// replacement labels escape UTF-8 bytes.
fn encode_component(s: &str, charset: &'static Encoding) -> Option<String> {
    let (bytes, _, had_errors) = charset.encode(s);
    if had_errors {
        return None;
    }
    Some(form_urlencoded::byte_serialize(&bytes).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_16LE, UTF_8, WINDOWS_1252};

    fn base() -> RequestOptionsBuilder {
        RequestOptions::builder(UTF_8).set_endpoint("http://x.test/items")
    }

    #[test]
    fn endpoint_without_query_params_is_unchanged() {
        let options = base().build();
        assert_eq!(options.endpoint().as_deref(), Some("http://x.test/items"));
    }

    #[test]
    fn empty_query_params_append_nothing() {
        let options = base()
            .with_query_params(Vec::<(String, String)>::new())
            .build();
        assert_eq!(options.endpoint().as_deref(), Some("http://x.test/items"));
    }

    #[test]
    fn query_params_follow_insertion_order() {
        let options = base()
            .with_query_params([("q", "shoes"), ("sort", "price"), ("a", "1")])
            .build();
        assert_eq!(
            options.endpoint().as_deref(),
            Some("http://x.test/items?q=shoes&sort=price&a=1")
        );
    }

    #[test]
    fn empty_keys_are_skipped_but_empty_values_kept() {
        let options = base()
            .with_query_params([("", "ignored"), ("q", "shoes"), ("page", "")])
            .build();
        assert_eq!(
            options.endpoint().as_deref(),
            Some("http://x.test/items?q=shoes&page=")
        );
    }

    #[test]
    fn only_empty_keys_means_no_question_mark() {
        let options = base().with_query_params([("", "a"), ("", "b")]).build();
        assert_eq!(options.endpoint().as_deref(), Some("http://x.test/items"));
    }

    #[test]
    fn query_keys_and_values_are_form_encoded() {
        let options = base()
            .with_query_params([("full name", "Zoë & co"), ("x*y", "a.b-c_d~")])
            .build();
        assert_eq!(
            options.endpoint().as_deref(),
            Some("http://x.test/items?full+name=Zo%C3%AB+%26+co&x*y=a.b-c_d%7E")
        );
    }

    #[test]
    fn charset_controls_percent_encoding() {
        let options = RequestOptions::builder(WINDOWS_1252)
            .set_endpoint("http://x.test/")
            .with_query_params([("name", "Zoë")])
            .build();
        assert_eq!(options.endpoint().as_deref(), Some("http://x.test/?name=Zo%EB"));
    }

    #[test]
    fn utf16_charsets_escape_utf8_bytes() {
        let options = RequestOptions::builder(UTF_16LE)
            .set_endpoint("http://x.test/")
            .with_query_params([("name", "Zoë")])
            .build();
        assert_eq!(options.endpoint().as_deref(), Some("http://x.test/?name=Zo%C3%AB"));
    }

    #[test]
    fn unencodable_pairs_are_dropped() {
        let options = RequestOptions::builder(WINDOWS_1252)
            .set_endpoint("http://x.test/")
            .with_query_params([("a", "1"), ("emoji", "\u{1F600}"), ("b", "2")])
            .with_request_params([("\u{4E2D}", "zh"), ("c", "3")])
            .build();
        assert_eq!(options.endpoint().as_deref(), Some("http://x.test/?a=1&b=2"));
        assert_eq!(options.request_params_string(), "c=3");
    }

    #[test]
    fn missing_endpoint_stays_missing() {
        let options = RequestOptions::builder(UTF_8)
            .with_query_params([("q", "1")])
            .build();
        assert_eq!(options.endpoint(), None);
        assert_eq!(options.raw_endpoint(), None);
    }

    #[test]
    fn question_mark_is_always_used_as_separator() {
        let options = RequestOptions::builder(UTF_8)
            .set_endpoint("http://x.test/?fixed=1")
            .with_query_params([("q", "2")])
            .build();
        assert_eq!(
            options.endpoint().as_deref(),
            Some("http://x.test/?fixed=1?q=2")
        );
    }

    #[test]
    fn request_params_string_is_empty_without_params() {
        assert_eq!(base().build().request_params_string(), "");
    }

    #[test]
    fn request_params_string_joins_pairs_in_order() {
        let options = base()
            .with_request_params([("title", "Buy milk"), ("qty", "2"), ("note", "")])
            .build();
        assert_eq!(options.request_params_string(), "title=Buy+milk&qty=2&note=");
    }

    #[test]
    fn request_params_keep_empty_keys() {
        let options = base().with_request_params([("", "v"), ("k", "w")]).build();
        assert_eq!(options.request_params_string(), "=v&k=w");
    }

    #[test]
    fn method_defaults_to_get() {
        assert_eq!(base().build().method(), RequestMethod::Get);
        let options = base().set_request_method(RequestMethod::Delete).build();
        assert_eq!(options.method(), RequestMethod::Delete);
    }

    #[test]
    fn later_setters_replace_earlier_ones() {
        let options = base()
            .set_endpoint("http://y.test/")
            .with_query_params([("a", "1")])
            .with_query_params([("b", "2")])
            .build();
        assert_eq!(options.endpoint().as_deref(), Some("http://y.test/?b=2"));
        assert_eq!(options.query_params(), &[("b".to_string(), "2".to_string())]);
    }
}
