//! Asynchronous request client backed by a single worker thread.
//!
//! # Design
//! `Client` owns one named worker thread and a bounded FIFO queue feeding
//! it. `request` only enqueues, so the caller never waits on the network.
//! The worker takes jobs one at a time: it builds the `HttpRequest`, runs it
//! through the `Transport`, classifies the response and invokes the
//! callback, all before looking at the next job. Callbacks therefore fire
//! in submission order, on the worker thread.
//!
//! Shutting down (explicitly or by dropping the client) closes the queue
//! and waits for the worker to finish everything already queued.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, error};

use crate::callback::{Outcome, ResultCallback};
use crate::error::{ClientError, RequestError, SubmitError};
use crate::http::{HttpRequest, Transport, UreqTransport};
use crate::options::RequestOptions;

/// Settings fixed for the lifetime of a `Client`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Charset used to write request bodies and to decode responses.
    pub charset: &'static Encoding,
    /// Maximum number of requests waiting for the worker. Values below 1
    /// are treated as 1.
    pub queue_capacity: usize,
    pub thread_name: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            charset: UTF_8,
            queue_capacity: 64,
            thread_name: "rest-client-worker".to_string(),
        }
    }
}

struct Job {
    options: RequestOptions,
    callback: Box<dyn ResultCallback>,
}

/// Submits requests to a dedicated worker and reports results through
/// `ResultCallback`.
pub struct Client {
    charset: &'static Encoding,
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl Client {
    /// Client with default settings and the given charset.
    pub fn new(charset: &'static Encoding) -> Result<Self, ClientError> {
        Self::with_config(ClientConfig {
            charset,
            ..ClientConfig::default()
        })
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_transport(config, UreqTransport::new())
    }

    /// Client whose worker sends requests through `transport`.
    pub fn with_transport<T: Transport>(
        config: ClientConfig,
        transport: T,
    ) -> Result<Self, ClientError> {
        let (sender, receiver) = crossbeam_channel::bounded(config.queue_capacity.max(1));
        let charset = config.charset;
        let worker = thread::Builder::new()
            .name(config.thread_name)
            .spawn(move || run_worker(receiver, transport, charset))
            .map_err(ClientError::Spawn)?;

        Ok(Self {
            charset,
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    pub fn charset(&self) -> &'static Encoding {
        self.charset
    }

    /// Queue a request. Returns immediately.
    ///
    /// On `Ok`, `callback` will be invoked exactly once from the worker
    /// thread. On `Err` the request was not queued and `callback` is dropped
    /// without being called.
    pub fn request<C: ResultCallback>(
        &self,
        options: RequestOptions,
        callback: C,
    ) -> Result<(), SubmitError> {
        let sender = self.sender.as_ref().ok_or(SubmitError::Closed)?;
        let job = Job {
            options,
            callback: Box::new(callback),
        };
        sender.try_send(job).map_err(|e| match e {
            TrySendError::Full(_) => SubmitError::QueueFull,
            TrySendError::Disconnected(_) => SubmitError::Closed,
        })
    }

    /// Stop accepting requests, run every queued one, then join the worker.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        drop(self.sender.take());
        let Some(worker) = self.worker.take() else {
            return;
        };
        // Dropped from inside a callback: the worker exits on its own once
        // the queue drains.
        if worker.thread().id() == thread::current().id() {
            return;
        }
        if worker.join().is_err() {
            error!("request worker terminated by a panic");
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_worker<T: Transport>(jobs: Receiver<Job>, transport: T, charset: &'static Encoding) {
    for Job { options, callback } in jobs {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            execute(&transport, &options, charset)
        }))
        .unwrap_or_else(|_| {
            error!("transport panicked");
            Outcome::Failure(RequestError::Transport("transport panicked".to_string()))
        });

        if panic::catch_unwind(AssertUnwindSafe(|| outcome.deliver(callback))).is_err() {
            error!("result callback panicked");
        }
    }
    debug!("request queue closed, worker exiting");
}

fn execute<T: Transport>(
    transport: &T,
    options: &RequestOptions,
    charset: &'static Encoding,
) -> Outcome {
    let request = match HttpRequest::from_options(options, charset) {
        Ok(request) => request,
        Err(e) => {
            error!(endpoint = ?options.raw_endpoint(), error = %e, "request abandoned before sending");
            return Outcome::Failure(e);
        }
    };

    debug!(method = %request.method, url = %request.url, "sending request");

    let response = match transport.execute(&request) {
        Ok(response) => response,
        Err(e) => {
            error!(method = %request.method, url = %request.url, error = %e, "request failed");
            return Outcome::Failure(e);
        }
    };

    let status = response.status;
    let outcome = response.into_outcome(charset);
    match &outcome {
        Outcome::Success(body) => debug!(status, body = %body, "success response"),
        Outcome::Error { body, .. } => debug!(status, body = %body, "error response"),
        Outcome::Failure(_) => {}
    }
    outcome
}
