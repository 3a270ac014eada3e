//! A small `OAuth2` token-exchange client.
//!
//! Describe the authorization server with a
//! [`ServiceConfiguration`](configuration::ServiceConfiguration), build a
//! validated [`TokenRequest`](request::TokenRequest) for a grant, and send it
//! with an [`AuthorizationService`](service::AuthorizationService) over any
//! [`HttpClient`](http::HttpClient).
//!
//! ```rust,no_run
//! use ravn::{
//!     configuration::ServiceConfiguration, request::TokenRequest,
//!     service::AuthorizationService,
//! };
//!
//! # async fn run<C: ravn::http::HttpClient>(http_client: C) -> Result<(), Box<dyn std::error::Error>> {
//! let configuration = ServiceConfiguration::builder()
//!     .authorization_endpoint("https://auth.example.com/oauth2/authorize")?
//!     .token_endpoint("https://auth.example.com/oauth2/token")?
//!     .build();
//!
//! let request = TokenRequest::builder()
//!     .configuration(configuration)
//!     .grant_type("client_credentials")
//!     .client_id("abc")
//!     .client_secret("secret")
//!     .scope("read")
//!     .build()?;
//!
//! let response = AuthorizationService::new(http_client)
//!     .exchange(&request)
//!     .await?;
//! println!("{}", response.access_token.expose_token());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod configuration;
mod endpoint_url;
mod error;
pub mod http;
pub mod pkce;
pub mod prelude;
pub mod request;
pub mod response;
pub mod service;
pub mod token;

pub use endpoint_url::{AuthorizationEndpoint, EndpointUrl, EndpointUrlError, IntoEndpointUrl};
pub use error::{BoxedError, Error};

/// Re-export of parts of the `secrecy` crate.
pub mod secrecy {
    pub use ::secrecy::{ExposeSecret, SecretString};
}

pub use bytes::Bytes;
