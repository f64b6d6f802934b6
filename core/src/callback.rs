//! Completion contract between the worker and the caller.
//!
//! Every submitted request ends in exactly one `Outcome`. The callback
//! methods take `Box<Self>` by value, so a callback can only ever be
//! invoked once.

use crate::error::RequestError;

/// Status code reported through `on_error` when no HTTP status was obtained.
pub const UNKNOWN_STATUS: i32 = -1;

/// The terminal result of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 200 with the drained body, or 204 with an empty body.
    Success(String),
    /// Any other status with the drained error body.
    Error { code: i32, body: String },
    /// No status was obtained: bad endpoint, connection or I/O failure.
    Failure(RequestError),
}

impl Outcome {
    /// Hand this outcome to the matching callback method.
    pub fn deliver(self, callback: Box<dyn ResultCallback>) {
        match self {
            Outcome::Success(body) => callback.on_success(body),
            Outcome::Error { code, body } => callback.on_error(code, body),
            Outcome::Failure(error) => callback.on_failure(error),
        }
    }
}

/// Receives the result of a request, on the client's worker thread.
///
/// Implementors that only care about the two HTTP cases can leave
/// `on_failure` alone; it reports transport failures as
/// `on_error(UNKNOWN_STATUS, message)`.
pub trait ResultCallback: Send + 'static {
    fn on_success(self: Box<Self>, body: String);

    fn on_error(self: Box<Self>, code: i32, body: String);

    fn on_failure(self: Box<Self>, error: RequestError) {
        self.on_error(UNKNOWN_STATUS, error.to_string());
    }
}

impl<F> ResultCallback for F
where
    F: FnOnce(Outcome) + Send + 'static,
{
    fn on_success(self: Box<Self>, body: String) {
        (*self)(Outcome::Success(body))
    }

    fn on_error(self: Box<Self>, code: i32, body: String) {
        (*self)(Outcome::Error { code, body })
    }

    fn on_failure(self: Box<Self>, error: RequestError) {
        (*self)(Outcome::Failure(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    struct TwoCase(mpsc::Sender<String>);

    impl ResultCallback for TwoCase {
        fn on_success(self: Box<Self>, body: String) {
            self.0.send(format!("ok:{body}")).unwrap();
        }

        fn on_error(self: Box<Self>, code: i32, body: String) {
            self.0.send(format!("err:{code}:{body}")).unwrap();
        }
    }

    #[test]
    fn closures_receive_the_outcome() {
        let (tx, rx) = mpsc::channel();
        let outcome = Outcome::Error {
            code: 404,
            body: "not found".to_string(),
        };
        outcome.deliver(Box::new(move |o: Outcome| tx.send(o).unwrap()));
        assert_eq!(
            rx.recv().unwrap(),
            Outcome::Error {
                code: 404,
                body: "not found".to_string()
            }
        );
    }

    #[test]
    fn closures_see_failures_as_their_own_case() {
        let (tx, rx) = mpsc::channel();
        Outcome::Failure(RequestError::MissingEndpoint)
            .deliver(Box::new(move |o: Outcome| tx.send(o).unwrap()));
        assert_eq!(
            rx.recv().unwrap(),
            Outcome::Failure(RequestError::MissingEndpoint)
        );
    }

    #[test]
    fn two_method_callbacks_get_failures_as_unknown_status() {
        let (tx, rx) = mpsc::channel();
        Outcome::Failure(RequestError::Transport("connection refused".to_string()))
            .deliver(Box::new(TwoCase(tx)));
        assert_eq!(
            rx.recv().unwrap(),
            "err:-1:transport error: connection refused"
        );
    }

    #[test]
    fn success_goes_to_on_success() {
        let (tx, rx) = mpsc::channel();
        Outcome::Success(String::new()).deliver(Box::new(TwoCase(tx)));
        assert_eq!(rx.recv().unwrap(), "ok:");
    }
}
