//! HTTP transport abstractions.
//!
//! The token exchange never talks to sockets itself. Callers inject an
//! [`HttpClient`] (backed by `reqwest`, `hyper`, or a scripted fake in tests)
//! and the library drives requests through it.

mod get;
#[cfg(feature = "http-client-reqwest")]
mod reqwest;

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode};

pub(crate) use get::{GetError, get};

/// The transport capability used to send requests.
///
/// Implementations must be safe to share between concurrent exchanges.
/// Timeouts, redirects and TLS are the implementation's concern.
pub trait HttpClient: Send + Sync {
    /// The error type returned by the client for a failed request.
    type Error: crate::Error;

    /// The associated response type returned by this HTTP client.
    type Response: HttpResponse;

    /// Executes an HTTP request and returns an owned response.
    ///
    /// # Arguments
    ///
    /// * `request`: The `http::Request` to be executed. The body is provided as `bytes::Bytes`.
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    type Error = C::Error;
    type Response = C::Response;

    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send {
        self.as_ref().execute(request)
    }
}

/// A response received from an [`HttpClient`].
pub trait HttpResponse: Send + Sync {
    /// The error type when reading the response body.
    type Error: crate::Error;

    /// Returns the HTTP status code of the response.
    fn status(&self) -> StatusCode;

    /// Returns the response's HTTP headers.
    fn headers(&self) -> HeaderMap;

    /// Consumes the response and returns its body.
    fn body(self) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;
}
