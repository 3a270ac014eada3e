//! Authorization server configuration.
//!
//! A [`ServiceConfiguration`] names the endpoints of an authorization server.
//! It is built by hand or discovered from the issuer's
//! `/.well-known/openid-configuration` document.

use bon::{Builder, bon};
use http::{HeaderMap, Uri};
use serde::Deserialize;
use snafu::prelude::*;

use crate::{
    AuthorizationEndpoint, EndpointUrl, EndpointUrlError, IntoEndpointUrl,
    configuration::builder::{IsUnset, SetAuthorizationEndpoint, SetTokenEndpoint, State},
    http::HttpClient,
};

/// The endpoints of an authorization server.
///
/// # Examples
///
/// ```rust
/// use ravn::configuration::ServiceConfiguration;
///
/// let configuration = ServiceConfiguration::builder()
///     .authorization_endpoint("https://auth.example.com/oauth2/authorize")?
///     .token_endpoint("https://auth.example.com/oauth2/token")?
///     .build();
///
/// assert_eq!(
///     configuration.token_endpoint().to_string(),
///     "https://auth.example.com/oauth2/token"
/// );
/// # Ok::<(), ravn::EndpointUrlError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder, Deserialize)]
#[builder(state_mod(name = "builder"))]
pub struct ServiceConfiguration {
    /// The authorization endpoint (RFC 6749 §3.1). Not used for token
    /// exchange, so it is only checked for a scheme.
    #[builder(setters(name = "authorization_endpoint_url"))]
    authorization_endpoint: AuthorizationEndpoint,

    /// The token endpoint (RFC 6749 §3.2).
    #[builder(setters(name = "token_endpoint_url"))]
    token_endpoint: EndpointUrl,

    /// The issuer identifier, when known.
    #[builder(into)]
    issuer: Option<String>,

    /// The dynamic client registration endpoint (RFC 7591), when published.
    registration_endpoint: Option<EndpointUrl>,
}

impl ServiceConfiguration {
    /// The authorization endpoint.
    #[must_use]
    pub fn authorization_endpoint(&self) -> &AuthorizationEndpoint {
        &self.authorization_endpoint
    }

    /// The token endpoint that token requests are posted to.
    #[must_use]
    pub fn token_endpoint(&self) -> &EndpointUrl {
        &self.token_endpoint
    }

    /// The issuer identifier.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// The registration endpoint.
    #[must_use]
    pub fn registration_endpoint(&self) -> Option<&EndpointUrl> {
        self.registration_endpoint.as_ref()
    }
}

impl<S: State> ServiceConfigurationBuilder<S> {
    /// Sets the authorization endpoint.
    ///
    /// Any value with a URI scheme is accepted, including placeholders such
    /// as `http://`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has no scheme.
    pub fn authorization_endpoint(
        self,
        url: impl AsRef<str>,
    ) -> Result<ServiceConfigurationBuilder<SetAuthorizationEndpoint<S>>, EndpointUrlError>
    where
        S::AuthorizationEndpoint: IsUnset,
    {
        Ok(self.authorization_endpoint_url(AuthorizationEndpoint::parse(url.as_ref())?))
    }

    /// Sets the token endpoint URL.
    ///
    /// Accepts any type that implements [`IntoEndpointUrl`], including
    /// `&str`, [`String`], [`Url`](url::Url), [`Uri`] and [`EndpointUrl`].
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a valid absolute URL.
    pub fn token_endpoint<U: IntoEndpointUrl>(
        self,
        url: U,
    ) -> Result<ServiceConfigurationBuilder<SetTokenEndpoint<S>>, U::Error>
    where
        S::TokenEndpoint: IsUnset,
    {
        Ok(self.token_endpoint_url(url.into_endpoint_url()?))
    }
}

#[bon]
impl ServiceConfiguration {
    /// Fetches the configuration from an issuer's discovery document.
    ///
    /// The document is read from `<issuer><well_known_path>`, where the
    /// path defaults to `/.well-known/openid-configuration`.
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer is not a valid URL, the document could
    /// not be fetched, or it is missing the required endpoints.
    #[builder]
    pub async fn discover<C: HttpClient>(
        #[builder(start_fn, into)] issuer: String,
        #[builder(finish_fn)] http_client: &C,
        #[builder(into, default = "/.well-known/openid-configuration")] well_known_path: &str,
    ) -> Result<Self, DiscoveryError> {
        let document_uri =
            add_issuer_to_known_path(&issuer, well_known_path).context(BadIssuerSnafu)?;

        crate::http::get(http_client, document_uri, HeaderMap::new())
            .await
            .context(FetchSnafu)
    }
}

/// Errors raised while discovering a [`ServiceConfiguration`].
#[derive(Debug, Snafu)]
pub enum DiscoveryError {
    /// The issuer could not be turned into a discovery URL.
    #[snafu(display("Invalid issuer URL"))]
    BadIssuer {
        /// The underlying error when building the URL.
        source: http::Error,
    },
    /// The discovery document could not be fetched or decoded.
    #[snafu(display("Failed to fetch discovery document"))]
    Fetch {
        /// The underlying error.
        source: crate::http::GetError,
    },
}

impl crate::Error for DiscoveryError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::BadIssuer { .. } => false,
            Self::Fetch { source } => source.is_retryable(),
        }
    }
}

fn add_issuer_to_known_path(issuer: &str, well_known_path: &str) -> Result<Uri, http::Error> {
    let issuer_as_uri = Uri::try_from(issuer)?;
    let path = issuer_as_uri.path();
    let cleaned_path = path.strip_suffix('/').unwrap_or(path);
    let new_path = format!("{cleaned_path}{well_known_path}");
    let mut parts = issuer_as_uri.into_parts();
    parts.path_and_query = Some(new_path.try_into()?);
    Ok(Uri::from_parts(parts)?)
}
