//! Fire-and-forget HTTP request client.
//!
//! # Overview
//! Callers describe a request with `RequestOptions` (endpoint, verb, query
//! and form parameters, charset) and hand it to a `Client` together with a
//! `ResultCallback`. The client executes the exchange on its own worker
//! thread and reports the raw response text through the callback.
//!
//! # Design
//! - One worker per `Client`, fed by a bounded FIFO queue: requests from the
//!   same client never overlap and complete in submission order.
//! - 200 and 204 are successes; every other status goes to `on_error` with
//!   the response body. Requests that never get a status (bad endpoint,
//!   connection failure) end in `on_failure`.
//! - Building and classifying requests is pure (`http` module); only the
//!   `Transport` implementation does I/O.
//!
//! ```no_run
//! use rest_client::{Client, Outcome, RequestMethod, RequestOptions};
//! use rest_client::encoding_rs::UTF_8;
//!
//! let client = Client::new(UTF_8).unwrap();
//! let options = RequestOptions::builder(UTF_8)
//!     .set_endpoint("http://localhost:3000/items")
//!     .set_request_method(RequestMethod::Post)
//!     .with_request_params([("name", "apples"), ("quantity", "3")])
//!     .build();
//! client
//!     .request(options, |outcome: Outcome| println!("{outcome:?}"))
//!     .unwrap();
//! client.shutdown();
//! ```

pub mod callback;
pub mod client;
pub mod error;
pub mod http;
pub mod method;
pub mod options;

pub use callback::{Outcome, ResultCallback, UNKNOWN_STATUS};
pub use client::{Client, ClientConfig};
pub use encoding_rs;
pub use error::{ClientError, ParseMethodError, RequestError, SubmitError};
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use method::RequestMethod;
pub use options::{RequestOptions, RequestOptionsBuilder};
