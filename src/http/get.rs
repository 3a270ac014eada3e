use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode, header::ACCEPT};
use serde::de::DeserializeOwned;
use snafu::prelude::*;
use tracing::debug;

use crate::{
    BoxedError,
    http::{HttpClient, HttpResponse},
};

/// Errors from a JSON `GET` request.
#[derive(Debug, Snafu)]
pub enum GetError {
    /// The request could not be sent.
    #[snafu(display("Failed to make HTTP request"))]
    Request {
        /// The transport error.
        source: BoxedError,
    },
    /// The response body could not be read.
    #[snafu(display("Failed to read response body"))]
    Response {
        /// The transport error.
        source: BoxedError,
    },
    /// The response body was not the expected JSON document.
    #[snafu(display("Failed to deserialize response body"))]
    Deserialize {
        /// The JSON error.
        source: serde_json::Error,
    },
    /// The server answered with a non-success status.
    #[snafu(display("Unexpected status {status}"))]
    BadStatus {
        /// The status code.
        status: StatusCode,
        /// The raw body.
        body: Bytes,
    },
}

impl crate::Error for GetError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Request { source } | Self::Response { source } => source.is_retryable(),
            Self::Deserialize { .. } => false,
            Self::BadStatus { status, .. } => status.is_server_error(),
        }
    }
}

pub(crate) async fn get<C: HttpClient, T: DeserializeOwned>(
    http_client: &C,
    uri: http::Uri,
    mut headers: HeaderMap,
) -> Result<T, GetError> {
    headers
        .entry(ACCEPT)
        .or_insert(HeaderValue::from_static("application/json"));

    let (mut parts, ()) = http::Request::new(()).into_parts();
    parts.headers = headers;
    parts.uri = uri;
    debug!(uri = %parts.uri, "GET");
    let request = http::Request::from_parts(parts, Bytes::new());

    let response = http_client
        .execute(request)
        .await
        .map_err(BoxedError::from_err)
        .context(RequestSnafu)?;
    let status = response.status();
    let body = response
        .body()
        .await
        .map_err(BoxedError::from_err)
        .context(ResponseSnafu)?;

    if status.is_success() {
        serde_json::from_slice(&body).context(DeserializeSnafu)
    } else {
        BadStatusSnafu { status, body }.fail()
    }
}
