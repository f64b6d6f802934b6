//! C-ABI wrapper around `rest-client-core`.
//!
//! # Overview
//! Exposes the asynchronous request client through `extern "C"` functions
//! so any language with a C FFI can submit requests and receive results
//! through function-pointer callbacks.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Options are accumulated in an opaque handle and frozen into core
//!   `RequestOptions` when the request is submitted.
//! - `rest_client_request` always takes ownership of the options handle,
//!   whether or not the request was queued.
//! - Strings returned to C are owned by the caller and must be released with
//!   `rest_free_string`. Strings passed to callbacks are borrowed for the
//!   duration of the call only.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rest_client::encoding_rs::Encoding;
use rest_client::{Client, SubmitError};

use types::*;

/// Borrow a C string as UTF-8. `None` for null or invalid UTF-8.
fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn charset_for(label: *const c_char) -> Option<&'static Encoding> {
    Encoding::for_label(c_str(label)?.as_bytes())
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client whose worker writes bodies and decodes responses in the
/// charset named by `charset_label` (e.g. "utf-8").
///
/// Returns null if the label is null or unknown, or the worker could not
/// be started. Free with `rest_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_new(charset_label: *const c_char) -> *mut FfiRestClient {
    catch_unwind(|| {
        let Some(charset) = charset_for(charset_label) else {
            return std::ptr::null_mut();
        };
        match Client::new(charset) {
            Ok(inner) => Box::into_raw(Box::new(FfiRestClient { inner })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client. Blocks until every queued request has completed and its
/// callback has returned. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_free(client: *mut FfiRestClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let client = unsafe { Box::from_raw(client) };
            client.inner.shutdown();
        }));
    }
}

/// Queue a request described by `options`.
///
/// Takes ownership of `options` in every case; do not free it afterwards.
/// On `Ok`, exactly one of the callbacks in `callbacks` is invoked later
/// from the client's worker thread.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_request(
    client: *const FfiRestClient,
    options: *mut FfiRequestOptions,
    callbacks: FfiCallbacks,
) -> FfiSubmitStatus {
    catch_unwind(AssertUnwindSafe(|| {
        if options.is_null() {
            return FfiSubmitStatus::NullArg;
        }
        let options = unsafe { Box::from_raw(options) };
        if client.is_null() {
            return FfiSubmitStatus::NullArg;
        }
        let Some(callback) = ForeignCallback::new(&callbacks) else {
            return FfiSubmitStatus::NullArg;
        };
        let client = unsafe { &*client };
        match client.inner.request(options.to_core(), callback) {
            Ok(()) => FfiSubmitStatus::Ok,
            Err(SubmitError::QueueFull) => FfiSubmitStatus::QueueFull,
            Err(SubmitError::Closed) => FfiSubmitStatus::Closed,
        }
    }))
    .unwrap_or(FfiSubmitStatus::Panic)
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Create empty options whose parameters are percent-encoded in the charset
/// named by `charset_label`. The method defaults to GET.
///
/// Returns null if the label is null or unknown. Free with
/// `rest_options_free` unless passed to `rest_client_request`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_options_new(charset_label: *const c_char) -> *mut FfiRequestOptions {
    catch_unwind(|| match charset_for(charset_label) {
        Some(charset) => Box::into_raw(Box::new(FfiRequestOptions::new(charset))),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Set the base URL. Returns false on a null or non-UTF-8 argument.
#[unsafe(no_mangle)]
pub extern "C" fn rest_options_set_endpoint(
    options: *mut FfiRequestOptions,
    endpoint: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if options.is_null() {
            return false;
        }
        let Some(endpoint) = c_str(endpoint) else {
            return false;
        };
        let options = unsafe { &mut *options };
        options.endpoint = Some(endpoint.to_string());
        true
    }))
    .unwrap_or(false)
}

#[unsafe(no_mangle)]
pub extern "C" fn rest_options_set_method(
    options: *mut FfiRequestOptions,
    method: FfiRequestMethod,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if options.is_null() {
            return false;
        }
        let options = unsafe { &mut *options };
        options.method = method.into();
        true
    }))
    .unwrap_or(false)
}

/// Append a query parameter. Returns false on a null or non-UTF-8 argument.
#[unsafe(no_mangle)]
pub extern "C" fn rest_options_add_query_param(
    options: *mut FfiRequestOptions,
    key: *const c_char,
    value: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        let (Some(key), Some(value)) = (c_str(key), c_str(value)) else {
            return false;
        };
        if options.is_null() {
            return false;
        }
        let options = unsafe { &mut *options };
        options.query_params.push((key.to_string(), value.to_string()));
        true
    }))
    .unwrap_or(false)
}

/// Append a form body parameter. Returns false on a null or non-UTF-8
/// argument.
#[unsafe(no_mangle)]
pub extern "C" fn rest_options_add_request_param(
    options: *mut FfiRequestOptions,
    key: *const c_char,
    value: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        let (Some(key), Some(value)) = (c_str(key), c_str(value)) else {
            return false;
        };
        if options.is_null() {
            return false;
        }
        let options = unsafe { &mut *options };
        options
            .request_params
            .push((key.to_string(), value.to_string()));
        true
    }))
    .unwrap_or(false)
}

/// The effective URL (endpoint plus encoded query string).
///
/// Returns null if `options` is null or no endpoint is set. Free with
/// `rest_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_options_endpoint(options: *const FfiRequestOptions) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if options.is_null() {
            return std::ptr::null_mut();
        }
        let options = unsafe { &*options };
        match options.to_core().endpoint() {
            Some(url) => to_c_string(url).into_raw(),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// The form-encoded body parameters, possibly empty.
///
/// Returns null if `options` is null. Free with `rest_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_options_request_params(
    options: *const FfiRequestOptions,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if options.is_null() {
            return std::ptr::null_mut();
        }
        let options = unsafe { &*options };
        to_c_string(options.to_core().request_params_string()).into_raw()
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free options that were not passed to `rest_client_request`. Safe to call
/// with null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_options_free(options: *mut FfiRequestOptions) {
    if !options.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(options) });
        }));
    }
}

/// Free a string returned by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { std::ffi::CString::from_raw(s) });
        }));
    }
}
