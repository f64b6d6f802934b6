//! HTTP exchange types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `HttpRequest::from_options` turns
//! `RequestOptions` into something a transport can send, and
//! `HttpResponse::into_outcome` classifies what came back. Only the
//! `Transport` implementation touches the network, so everything around it
//! stays deterministic and can be driven by a scripted transport in tests.

use encoding_rs::Encoding;
use tracing::warn;
use url::Url;

use crate::callback::Outcome;
use crate::error::RequestError;
use crate::method::RequestMethod;
use crate::options::RequestOptions;

/// A request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: RequestMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Resolve the effective URL and, for POST/PUT, serialize the form body
    /// as bytes in `charset`.
    ///
    /// Charsets that cannot be written (UTF-16, replacement) produce UTF-8
    /// bytes, and the `content-type` header names the charset actually used.
    pub fn from_options(
        options: &RequestOptions,
        charset: &'static Encoding,
    ) -> Result<Self, RequestError> {
        let endpoint = options.endpoint().ok_or(RequestError::MissingEndpoint)?;
        let url = Url::parse(&endpoint).map_err(|e| RequestError::InvalidUrl {
            url: endpoint.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RequestError::UnsupportedScheme(url.scheme().to_string()));
        }

        let method = options.method();
        let (headers, body) = if method.has_body() {
            let params = options.request_params_string();
            let (bytes, written_as, _) = charset.encode(&params);
            let content_type = format!(
                "application/x-www-form-urlencoded; charset={}",
                written_as.name().to_ascii_lowercase()
            );
            (
                vec![("content-type".to_string(), content_type)],
                Some(bytes.into_owned()),
            )
        } else {
            (Vec::new(), None)
        };

        Ok(HttpRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

/// Status and raw body bytes of a completed exchange.
///
/// For error statuses `body` holds the error payload; there is a single body
/// channel per response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// 200 and 204 are successes, every other status is an error.
    pub fn into_outcome(self, charset: &'static Encoding) -> Outcome {
        match self.status {
            200 => Outcome::Success(drain_lines(&self.body, charset)),
            204 => Outcome::Success(String::new()),
            code => Outcome::Error {
                code: i32::from(code),
                body: drain_lines(&self.body, charset),
            },
        }
    }
}

/// Decode `bytes` and concatenate its lines with the terminators removed.
///
/// `\n`, `\r\n` and a lone `\r` all end a line; none of them survive.
pub fn drain_lines(bytes: &[u8], charset: &'static Encoding) -> String {
    let (text, _) = charset.decode_without_bom_handling(bytes);
    text.split(|c: char| c == '\r' || c == '\n').collect()
}

/// Performs one HTTP exchange.
///
/// Implementations return `Err` only when no status code was obtained.
pub trait Transport: Send + 'static {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, RequestError>;
}

/// Blocking transport backed by a `ureq` agent.
///
/// Status codes are returned as data rather than errors, and connections are
/// not kept idle between requests.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_idle_connections(0)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, RequestError> {
        let url = request.url.as_str();
        let body = request.body.as_deref().unwrap_or_default();

        let result = match request.method {
            RequestMethod::Get => with_headers(self.agent.get(url), &request.headers).call(),
            RequestMethod::Delete => {
                with_headers(self.agent.delete(url), &request.headers).call()
            }
            RequestMethod::Post => with_headers(self.agent.post(url), &request.headers).send(body),
            RequestMethod::Put => with_headers(self.agent.put(url), &request.headers).send(body),
        };
        let mut response = result.map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = match response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
        {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(status, error = %e, "failed to read response body, using empty body");
                Vec::new()
            }
        };
        Ok(HttpResponse { status, body })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
