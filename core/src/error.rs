//! Error types for the request client.
//!
//! # Design
//! Three separate enums keep the three failure points apart:
//! `RequestError` is the terminal outcome of one submitted request and is
//! delivered through the callback, `SubmitError` is returned synchronously
//! when the queue refuses a request, and `ClientError` covers building the
//! client itself. HTTP error statuses are not errors here; they reach the
//! caller through `ResultCallback::on_error`.

use thiserror::Error;

/// Why a submitted request ended without an HTTP status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The options carried no endpoint at all.
    #[error("no endpoint configured")]
    MissingEndpoint,

    /// The effective endpoint could not be parsed as a URL.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The URL parsed but is not http or https.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// Connecting, writing the body or reading the status line failed.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Returned by `Client::request` when the job never reaches the worker.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("request queue is full")]
    QueueFull,

    #[error("client has been shut down")]
    Closed,
}

/// Failure to construct a `Client`.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Returned by `RequestMethod::from_str` for verbs outside GET/POST/PUT/DELETE.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported request method: {0}")]
pub struct ParseMethodError(pub String);
