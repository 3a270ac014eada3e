//! A validated, absolute endpoint URL.
//!
//! [`EndpointUrl`] is a newtype over [`Uri`] that guarantees the URL carries
//! a scheme and an authority. It can be constructed from common string and
//! URL types via [`IntoEndpointUrl`].
//!
//! [`AuthorizationEndpoint`] is looser: this crate never sends a request to
//! it, so any string with a URI scheme is accepted.

use std::{convert::Infallible, fmt};

use http::{Uri, uri::InvalidUri};
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use url::Url;

/// A validated, absolute endpoint URL.
///
/// Once constructed it can be cloned and shared between configurations
/// without re-validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointUrl(Uri);

impl Serialize for EndpointUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for EndpointUrl {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.into_endpoint_url().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for EndpointUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl EndpointUrl {
    /// Returns the inner [`Uri`].
    #[must_use]
    pub fn as_uri(&self) -> &Uri {
        &self.0
    }

    /// Consumes the [`EndpointUrl`] and returns the inner [`Uri`].
    #[must_use]
    pub fn into_uri(self) -> Uri {
        self.0
    }

    fn from_uri(uri: Uri) -> Result<Self, EndpointUrlError> {
        ensure!(
            uri.scheme().is_some() && uri.authority().is_some(),
            NotAbsoluteSnafu {
                url: uri.to_string()
            }
        );
        Ok(Self(uri))
    }
}

/// Errors raised when a value cannot be used as an endpoint URL.
#[derive(Debug, Snafu)]
pub enum EndpointUrlError {
    /// The value could not be parsed as a URI.
    #[snafu(display("Invalid endpoint URL"))]
    Parse {
        /// The underlying parse error.
        source: InvalidUri,
    },
    /// The URI has no scheme or no authority.
    #[snafu(display("Endpoint URL must be absolute: {url}"))]
    NotAbsolute {
        /// The rejected URL.
        url: String,
    },
    /// The value does not start with a URI scheme (RFC 3986 §3.1).
    #[snafu(display("URL has no scheme: {url}"))]
    MissingScheme {
        /// The rejected URL.
        url: String,
    },
}

impl crate::Error for EndpointUrlError {
    fn is_retryable(&self) -> bool {
        false
    }
}

/// The authorization endpoint of a server.
///
/// Only the syntax of the scheme is checked, so placeholders such as
/// `http://` are accepted. Values that parse as a [`Url`] are stored in their
/// normalized form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationEndpoint(String);

impl AuthorizationEndpoint {
    /// Parses an authorization endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointUrlError::MissingScheme`] if the value does not start
    /// with `scheme:`, or contains whitespace or control characters.
    pub fn parse(url: &str) -> Result<Self, EndpointUrlError> {
        if let Ok(parsed) = Url::parse(url) {
            return Ok(Self(parsed.into()));
        }

        let valid_scheme = url.split_once(':').is_some_and(|(scheme, _)| {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        });
        ensure!(
            valid_scheme && !url.chars().any(|c| c.is_whitespace() || c.is_control()),
            MissingSchemeSnafu { url }
        );
        Ok(Self(url.to_owned()))
    }

    /// The endpoint as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorizationEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AuthorizationEndpoint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Conversion trait for types that can be turned into an [`EndpointUrl`].
pub trait IntoEndpointUrl {
    /// The error type returned if the conversion fails.
    type Error;

    /// Attempts to convert this value into an [`EndpointUrl`].
    fn into_endpoint_url(self) -> Result<EndpointUrl, Self::Error>;
}

impl IntoEndpointUrl for EndpointUrl {
    type Error = Infallible;

    fn into_endpoint_url(self) -> Result<EndpointUrl, Self::Error> {
        Ok(self)
    }
}

impl IntoEndpointUrl for Uri {
    type Error = EndpointUrlError;

    fn into_endpoint_url(self) -> Result<EndpointUrl, Self::Error> {
        EndpointUrl::from_uri(self)
    }
}

impl IntoEndpointUrl for Url {
    type Error = EndpointUrlError;

    fn into_endpoint_url(self) -> Result<EndpointUrl, Self::Error> {
        self.as_str().into_endpoint_url()
    }
}

impl IntoEndpointUrl for &str {
    type Error = EndpointUrlError;

    fn into_endpoint_url(self) -> Result<EndpointUrl, Self::Error> {
        EndpointUrl::from_uri(self.parse::<Uri>().context(ParseSnafu)?)
    }
}

impl IntoEndpointUrl for String {
    type Error = EndpointUrlError;

    fn into_endpoint_url(self) -> Result<EndpointUrl, Self::Error> {
        self.as_str().into_endpoint_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_absolute_urls_from_every_source() {
        let from_str = "https://auth.example.com/oauth2/token"
            .into_endpoint_url()
            .unwrap();
        let from_url = Url::parse("https://auth.example.com/oauth2/token")
            .unwrap()
            .into_endpoint_url()
            .unwrap();

        assert_eq!(from_str, from_url);
        assert_eq!(from_str.as_uri().host(), Some("auth.example.com"));
        assert_eq!(from_str.to_string(), "https://auth.example.com/oauth2/token");
    }

    #[test]
    fn rejects_relative_urls() {
        let err = "/oauth2/token".into_endpoint_url().unwrap_err();
        assert!(matches!(err, EndpointUrlError::NotAbsolute { .. }));
    }

    #[test]
    fn rejects_unparseable_urls() {
        let err = "https://exa mple.com".into_endpoint_url().unwrap_err();
        assert!(matches!(err, EndpointUrlError::Parse { .. }));
    }

    #[test]
    fn authorization_endpoint_accepts_scheme_only_placeholder() {
        let endpoint = AuthorizationEndpoint::parse("http://").unwrap();
        assert_eq!(endpoint.as_str(), "http://");

        let endpoint = AuthorizationEndpoint::parse("https://auth.example.com/authorize").unwrap();
        assert_eq!(endpoint.to_string(), "https://auth.example.com/authorize");
    }

    #[test]
    fn authorization_endpoint_needs_a_scheme() {
        for url in ["", "/authorize", "auth.example.com", "1http://x", "http:// x"] {
            let err = AuthorizationEndpoint::parse(url).unwrap_err();
            assert!(matches!(err, EndpointUrlError::MissingScheme { .. }), "{url}");
        }
    }

    #[test]
    fn deserializes_with_validation() {
        let url: EndpointUrl = serde_json::from_str(r#""https://a.example/token""#).unwrap();
        assert_eq!(url.as_uri().path(), "/token");

        assert!(serde_json::from_str::<EndpointUrl>(r#""token""#).is_err());
    }
}
