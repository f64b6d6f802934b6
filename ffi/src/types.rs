//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Opaque handles wrap the core `Client` and an options accumulator; C
//! callers only ever hold pointers to them. Callbacks are plain function
//! pointers plus a `user_data` pointer that is passed back untouched.
//! Conversion helpers live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use rest_client::encoding_rs::Encoding;
use rest_client::{RequestError, RequestMethod, RequestOptions, ResultCallback};

/// Opaque handle to a `Client`.
pub struct FfiRestClient {
    pub(crate) inner: rest_client::Client,
}

/// Opaque, mutable request options. Parameters are appended one pair at a
/// time and turned into `RequestOptions` on submission.
pub struct FfiRequestOptions {
    pub(crate) charset: &'static Encoding,
    pub(crate) endpoint: Option<String>,
    pub(crate) method: RequestMethod,
    pub(crate) query_params: Vec<(String, String)>,
    pub(crate) request_params: Vec<(String, String)>,
}

impl FfiRequestOptions {
    pub(crate) fn new(charset: &'static Encoding) -> Self {
        Self {
            charset,
            endpoint: None,
            method: RequestMethod::Get,
            query_params: Vec::new(),
            request_params: Vec::new(),
        }
    }

    pub(crate) fn to_core(&self) -> RequestOptions {
        let builder = RequestOptions::builder(self.charset)
            .set_request_method(self.method)
            .with_query_params(self.query_params.iter().cloned())
            .with_request_params(self.request_params.iter().cloned());
        match &self.endpoint {
            Some(endpoint) => builder.set_endpoint(endpoint.as_str()).build(),
            None => builder.build(),
        }
    }
}

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiRequestMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<FfiRequestMethod> for RequestMethod {
    fn from(m: FfiRequestMethod) -> Self {
        match m {
            FfiRequestMethod::Get => RequestMethod::Get,
            FfiRequestMethod::Post => RequestMethod::Post,
            FfiRequestMethod::Put => RequestMethod::Put,
            FfiRequestMethod::Delete => RequestMethod::Delete,
        }
    }
}

/// Result of `rest_client_request`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiSubmitStatus {
    /// Queued; exactly one callback will fire on the worker thread.
    Ok = 0,
    NullArg = 1,
    QueueFull = 2,
    Closed = 3,
    Panic = 4,
}

/// `body` is only valid for the duration of the call.
pub type FfiSuccessFn = extern "C" fn(user_data: *mut c_void, body: *const c_char);

/// `body` is only valid for the duration of the call.
pub type FfiErrorFn = extern "C" fn(user_data: *mut c_void, code: i32, body: *const c_char);

/// `message` is only valid for the duration of the call.
pub type FfiFailureFn = extern "C" fn(user_data: *mut c_void, message: *const c_char);

/// Callback table for one request.
///
/// `on_success` and `on_error` are required. When `on_failure` is null,
/// transport failures are reported through `on_error` with code -1.
/// Callbacks run on the client's worker thread.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FfiCallbacks {
    pub user_data: *mut c_void,
    pub on_success: Option<FfiSuccessFn>,
    pub on_error: Option<FfiErrorFn>,
    pub on_failure: Option<FfiFailureFn>,
}

/// `ResultCallback` that forwards to C function pointers.
pub(crate) struct ForeignCallback {
    user_data: *mut c_void,
    on_success: FfiSuccessFn,
    on_error: FfiErrorFn,
    on_failure: Option<FfiFailureFn>,
}

// The C caller guarantees `user_data` may be used from the worker thread.
unsafe impl Send for ForeignCallback {}

impl ForeignCallback {
    /// `None` if a required callback is missing.
    pub(crate) fn new(callbacks: &FfiCallbacks) -> Option<Self> {
        Some(Self {
            user_data: callbacks.user_data,
            on_success: callbacks.on_success?,
            on_error: callbacks.on_error?,
            on_failure: callbacks.on_failure,
        })
    }
}

impl ResultCallback for ForeignCallback {
    fn on_success(self: Box<Self>, body: String) {
        let body = to_c_string(body);
        (self.on_success)(self.user_data, body.as_ptr());
    }

    fn on_error(self: Box<Self>, code: i32, body: String) {
        let body = to_c_string(body);
        (self.on_error)(self.user_data, code, body.as_ptr());
    }

    fn on_failure(self: Box<Self>, error: RequestError) {
        match self.on_failure {
            Some(on_failure) => {
                let message = to_c_string(error.to_string());
                on_failure(self.user_data, message.as_ptr());
            }
            None => self.on_error(rest_client::UNKNOWN_STATUS, error.to_string()),
        }
    }
}

/// Convert to a C string, dropping interior NUL bytes.
pub(crate) fn to_c_string(s: String) -> CString {
    CString::new(s).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rest_client::encoding_rs::UTF_8;

    #[test]
    fn interior_nul_bytes_are_dropped() {
        assert_eq!(to_c_string("a\0b".to_string()).as_bytes(), b"ab");
    }

    #[test]
    fn options_without_endpoint_stay_without_endpoint() {
        let options = FfiRequestOptions::new(UTF_8).to_core();
        assert_eq!(options.endpoint(), None);
        assert_eq!(options.method(), RequestMethod::Get);
    }

    #[test]
    fn missing_required_callback_is_rejected() {
        let callbacks = FfiCallbacks {
            user_data: std::ptr::null_mut(),
            on_success: None,
            on_error: None,
            on_failure: None,
        };
        assert!(ForeignCallback::new(&callbacks).is_none());
    }
}
