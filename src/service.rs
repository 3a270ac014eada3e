//! Sending token requests.
//!
//! [`AuthorizationService`] drives a [`TokenRequest`] through the injected
//! [`HttpClient`] and decodes the outcome. The result is available either as
//! a future ([`AuthorizationService::exchange`]) or through a completion
//! callback that runs exactly once ([`AuthorizationService::perform`]).

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use snafu::prelude::*;
use tokio::{
    sync::oneshot,
    task::{JoinError, JoinHandle},
};
use tracing::{debug, warn};

use crate::{
    BoxedError,
    http::{HttpClient, HttpResponse},
    request::{EncodeError, TokenRequest},
    response::{OAuthErrorBody, TokenResponse},
};

/// Sends token requests over an injected transport.
///
/// Each call makes a single attempt; retries belong to the caller.
#[derive(Debug)]
pub struct AuthorizationService<C> {
    http_client: Arc<C>,
}

impl<C> Clone for AuthorizationService<C> {
    fn clone(&self) -> Self {
        Self {
            http_client: Arc::clone(&self.http_client),
        }
    }
}

impl<C: HttpClient> AuthorizationService<C> {
    /// Creates a service that sends requests with `http_client`.
    pub fn new(http_client: C) -> Self {
        Self::from_shared(Arc::new(http_client))
    }

    /// Creates a service around a transport that is shared elsewhere.
    pub fn from_shared(http_client: Arc<C>) -> Self {
        Self { http_client }
    }

    /// The transport used by this service.
    #[must_use]
    pub fn http_client(&self) -> &C {
        &self.http_client
    }

    /// Sends `request` and decodes the response.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] if the transport fails, the server answers
    /// with an `OAuth2` error, or the response cannot be decoded.
    #[tracing::instrument(
        name = "token_exchange",
        level = "debug",
        skip_all,
        fields(
            token_endpoint = %request.token_endpoint(),
            grant_type = %request.grant_type(),
            client_auth = request.client_auth_method().as_str(),
        )
    )]
    pub async fn exchange(&self, request: &TokenRequest) -> Result<TokenResponse, TokenError> {
        let http_request = request.to_http_request().context(EncodeSnafu)?;

        debug!("sending token request");
        let response = self
            .http_client
            .execute(http_request)
            .await
            .map_err(BoxedError::from_err)
            .context(NetworkFailureSnafu)?;
        let status = response.status();
        let body = response
            .body()
            .await
            .map_err(BoxedError::from_err)
            .context(NetworkFailureSnafu)?;
        debug!(%status, "received token response");

        parse_token_response(status, &body)
    }
}

impl<C: HttpClient + 'static> AuthorizationService<C> {
    /// Sends `request` in the background and passes the outcome to
    /// `completion`.
    ///
    /// Returns immediately. `completion` runs exactly once, on a tokio worker,
    /// with either the token response or the error. Use the returned
    /// [`PerformHandle`] to cancel or to wait for the completion to run.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn perform<F>(&self, request: TokenRequest, completion: F) -> PerformHandle
    where
        F: FnOnce(Result<TokenResponse, TokenError>) + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let service = self.clone();

        let task = tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                Ok(()) = cancel_rx => {
                    debug!("token request cancelled");
                    CancelledSnafu.fail()
                }
                outcome = service.exchange(&request) => outcome,
            };
            completion(outcome);
        });

        PerformHandle {
            cancel: Some(cancel_tx),
            task,
        }
    }
}

/// A handle to a request started with [`AuthorizationService::perform`].
///
/// Dropping the handle does not cancel the request.
#[derive(Debug)]
pub struct PerformHandle {
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PerformHandle {
    /// Cancels the request.
    ///
    /// If the completion has not run yet, it runs with
    /// [`TokenError::Cancelled`]. Otherwise this does nothing.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // The receiver is gone once the exchange has finished.
            let _ = cancel.send(());
        }
    }

    /// Returns `true` once the completion has run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits until the completion has run.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion panicked or the runtime shut down
    /// before it could run.
    pub async fn wait(self) -> Result<(), JoinError> {
        self.task.await
    }
}

fn parse_token_response(status: StatusCode, body: &Bytes) -> Result<TokenResponse, TokenError> {
    if status != StatusCode::OK {
        let error_body = serde_json::from_slice::<OAuthErrorBody>(body).context(
            InvalidResponseSnafu {
                status,
                body: String::from_utf8_lossy(body),
            },
        )?;

        warn!(
            %status,
            error = %error_body.error,
            description = error_body.error_description.as_deref().unwrap_or_default(),
            "token endpoint returned an error"
        );
        return OAuthSnafu {
            body: error_body,
            status,
        }
        .fail();
    }

    serde_json::from_slice(body).context(InvalidResponseSnafu {
        status,
        body: String::from_utf8_lossy(body),
    })
}

/// The category of a [`TokenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never produced a response.
    NetworkFailure,
    /// The response could not be decoded.
    InvalidResponse,
    /// The server returned an `OAuth2` error.
    OAuth,
    /// The request was cancelled.
    Cancelled,
    /// The request could not be encoded.
    Encode,
}

/// Errors delivered by [`AuthorizationService`].
#[derive(Debug, Snafu)]
pub enum TokenError {
    /// The transport failed or the response body could not be read.
    #[snafu(display("Failed to reach the token endpoint"))]
    NetworkFailure {
        /// The transport error.
        source: BoxedError,
    },
    /// The response was not a decodable token or error payload.
    #[snafu(display("Failed to decode token endpoint response: status={status}"))]
    InvalidResponse {
        /// The status code of the response.
        status: StatusCode,
        /// The body of the response.
        body: String,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
    /// The server returned an `OAuth2` error payload.
    #[snafu(display("Token request failed with OAuth2 error `{}`", body.error))]
    OAuth {
        /// The error payload.
        body: OAuthErrorBody,
        /// The status code of the response.
        status: StatusCode,
    },
    /// The request was cancelled before it completed.
    #[snafu(display("Token request was cancelled"))]
    Cancelled,
    /// The request could not be encoded.
    #[snafu(display("Failed to encode token request"))]
    Encode {
        /// The underlying error.
        source: EncodeError,
    },
}

impl TokenError {
    /// The category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkFailure { .. } => ErrorKind::NetworkFailure,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::OAuth { .. } => ErrorKind::OAuth,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Encode { .. } => ErrorKind::Encode,
        }
    }

    /// The server's error payload, for [`ErrorKind::OAuth`] errors.
    #[must_use]
    pub fn oauth_error(&self) -> Option<&OAuthErrorBody> {
        match self {
            Self::OAuth { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl crate::Error for TokenError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkFailure { source } => source.is_retryable(),
            Self::InvalidResponse { status, .. } | Self::OAuth { status, .. } => {
                status.is_server_error()
            }
            Self::Cancelled | Self::Encode { .. } => false,
        }
    }
}
