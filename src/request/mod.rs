//! Token requests.
//!
//! A [`TokenRequest`] is validated when it is built: a request for a grant
//! that lacks one of that grant's required fields cannot be constructed.
//! [`TokenRequest::to_http_request`] turns it into the wire request.

mod client_auth;
mod encode;
mod error;
mod grant;

use std::{collections::BTreeMap, sync::Arc};

use bon::bon;
use secrecy::{ExposeSecret as _, SecretString};
use snafu::prelude::*;
use tracing::{debug, warn};
use url::Url;

use crate::{EndpointUrl, configuration::ServiceConfiguration};

pub use client_auth::ClientAuthMethod;
pub use encode::EncodeError;
pub use error::ConstructionError;
pub use grant::{Grant, GrantType};

use error::{
    CodeVerifierNotAllowedSnafu, EmptyGrantTypeSnafu, MissingAuthorizationCodeSnafu,
    MissingRedirectUrlSnafu, MissingRefreshTokenSnafu, ReservedParameterSnafu,
    StandardGrantAsExtensionSnafu,
};

/// Parameter names that additional parameters may not use.
pub const RESERVED_PARAMETERS: &[&str] = &[
    "grant_type",
    "client_id",
    "client_secret",
    "code",
    "redirect_uri",
    "code_verifier",
    "refresh_token",
    "scope",
];

/// A validated request to the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    configuration: Arc<ServiceConfiguration>,
    grant: Grant,
    client_id: String,
    client_secret: Option<SecretString>,
    client_auth_method: ClientAuthMethod,
    scope: Option<String>,
    additional_parameters: BTreeMap<String, String>,
}

#[bon]
impl TokenRequest {
    /// Builds a token request from a grant type and the full set of
    /// optional fields.
    ///
    /// An extension grant type spelled like a standard grant is treated as
    /// that grant. The authorization code and redirect URL are ignored by
    /// other grants, as is the refresh token.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] if the grant type is blank, a field the
    /// grant requires is missing, a code verifier is given for a grant other
    /// than `authorization_code`, or an additional parameter uses a reserved
    /// name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ravn::{configuration::ServiceConfiguration, request::TokenRequest};
    ///
    /// let configuration = ServiceConfiguration::builder()
    ///     .authorization_endpoint("https://auth.example.com/authorize")?
    ///     .token_endpoint("https://auth.example.com/oauth2/token")?
    ///     .build();
    ///
    /// let request = TokenRequest::builder()
    ///     .configuration(configuration)
    ///     .grant_type("client_credentials")
    ///     .client_id("abc")
    ///     .client_secret("secret")
    ///     .scope("read")
    ///     .build()?;
    ///
    /// assert_eq!(request.grant_type().as_str(), "client_credentials");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[builder]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        #[builder(into)] configuration: Arc<ServiceConfiguration>,
        #[builder(into)] grant_type: GrantType,
        #[builder(into)] authorization_code: Option<String>,
        redirect_url: Option<Url>,
        #[builder(into)] client_id: String,
        #[builder(into)] client_secret: Option<SecretString>,
        #[builder(default)] client_auth_method: ClientAuthMethod,
        #[builder(into)] scope: Option<String>,
        #[builder(into)] refresh_token: Option<SecretString>,
        #[builder(into)] code_verifier: Option<String>,
        #[builder(default)] additional_parameters: BTreeMap<String, String>,
    ) -> Result<Self, ConstructionError> {
        let grant_type = match grant_type {
            GrantType::Extension(name) => GrantType::from(name),
            known => known,
        };

        let uses_code = grant_type == GrantType::AuthorizationCode;
        ensure!(
            uses_code || code_verifier.is_none(),
            CodeVerifierNotAllowedSnafu {
                grant_type: grant_type.as_str()
            }
        );
        if !uses_code && (authorization_code.is_some() || redirect_url.is_some()) {
            debug!(%grant_type, "ignoring authorization code fields");
        }
        if grant_type != GrantType::RefreshToken && refresh_token.is_some() {
            debug!(%grant_type, "ignoring refresh token");
        }

        let grant = match grant_type {
            GrantType::AuthorizationCode => Grant::AuthorizationCode {
                code: authorization_code.context(MissingAuthorizationCodeSnafu)?,
                redirect_url: redirect_url.context(MissingRedirectUrlSnafu)?,
                code_verifier,
            },
            GrantType::ClientCredentials => Grant::ClientCredentials,
            GrantType::RefreshToken => Grant::RefreshToken {
                refresh_token: refresh_token.context(MissingRefreshTokenSnafu)?,
            },
            GrantType::Extension(grant_type) => {
                check_extension_name(&grant_type)?;
                Grant::Extension { grant_type }
            }
        };

        Self::assemble(
            configuration,
            grant,
            client_id,
            client_secret,
            client_auth_method,
            scope,
            additional_parameters,
        )
    }

    /// Builds a token request from an already-typed [`Grant`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] if the grant is an extension grant with
    /// a blank name or the name of a standard grant, or an additional
    /// parameter uses a reserved name.
    #[builder(finish_fn = build)]
    pub fn for_grant(
        #[builder(start_fn)] grant: Grant,
        #[builder(into)] configuration: Arc<ServiceConfiguration>,
        #[builder(into)] client_id: String,
        #[builder(into)] client_secret: Option<SecretString>,
        #[builder(default)] client_auth_method: ClientAuthMethod,
        #[builder(into)] scope: Option<String>,
        #[builder(default)] additional_parameters: BTreeMap<String, String>,
    ) -> Result<Self, ConstructionError> {
        if let Grant::Extension { grant_type } = &grant {
            check_extension_name(grant_type)?;
        }

        Self::assemble(
            configuration,
            grant,
            client_id,
            client_secret,
            client_auth_method,
            scope,
            additional_parameters,
        )
    }
}

fn check_extension_name(grant_type: &str) -> Result<(), ConstructionError> {
    ensure!(!grant_type.trim().is_empty(), EmptyGrantTypeSnafu);
    ensure!(
        matches!(GrantType::from(grant_type), GrantType::Extension(_)),
        StandardGrantAsExtensionSnafu { grant_type }
    );
    Ok(())
}

impl TokenRequest {
    fn assemble(
        configuration: Arc<ServiceConfiguration>,
        grant: Grant,
        client_id: String,
        client_secret: Option<SecretString>,
        client_auth_method: ClientAuthMethod,
        scope: Option<String>,
        additional_parameters: BTreeMap<String, String>,
    ) -> Result<Self, ConstructionError> {
        if let Some(name) = additional_parameters
            .keys()
            .find(|name| RESERVED_PARAMETERS.contains(&name.as_str()))
        {
            return ReservedParameterSnafu { name: name.clone() }.fail();
        }

        if client_id.is_empty() {
            warn!("token request has an empty client_id");
        }

        Ok(Self {
            configuration,
            grant,
            client_id,
            client_secret,
            client_auth_method,
            scope,
            additional_parameters,
        })
    }

    /// The configuration of the server this request is for.
    #[must_use]
    pub fn configuration(&self) -> &Arc<ServiceConfiguration> {
        &self.configuration
    }

    /// The endpoint this request is sent to.
    #[must_use]
    pub fn token_endpoint(&self) -> &EndpointUrl {
        self.configuration.token_endpoint()
    }

    /// The grant and its fields.
    #[must_use]
    pub fn grant(&self) -> &Grant {
        &self.grant
    }

    /// The grant type.
    #[must_use]
    pub fn grant_type(&self) -> GrantType {
        self.grant.grant_type()
    }

    /// The authorization code, for `authorization_code` requests.
    #[must_use]
    pub fn authorization_code(&self) -> Option<&str> {
        match &self.grant {
            Grant::AuthorizationCode { code, .. } => Some(code),
            _ => None,
        }
    }

    /// The redirect URL, for `authorization_code` requests.
    #[must_use]
    pub fn redirect_url(&self) -> Option<&Url> {
        match &self.grant {
            Grant::AuthorizationCode { redirect_url, .. } => Some(redirect_url),
            _ => None,
        }
    }

    /// The PKCE code verifier, for `authorization_code` requests.
    #[must_use]
    pub fn code_verifier(&self) -> Option<&str> {
        match &self.grant {
            Grant::AuthorizationCode { code_verifier, .. } => code_verifier.as_deref(),
            _ => None,
        }
    }

    /// The refresh token, for `refresh_token` requests.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        match &self.grant {
            Grant::RefreshToken { refresh_token } => Some(refresh_token.expose_secret()),
            _ => None,
        }
    }

    /// The client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The client secret.
    #[must_use]
    pub fn client_secret(&self) -> Option<&SecretString> {
        self.client_secret.as_ref()
    }

    /// How the client secret is sent.
    #[must_use]
    pub fn client_auth_method(&self) -> ClientAuthMethod {
        self.client_auth_method
    }

    /// The requested scope string.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// The requested scopes, split on whitespace.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.as_deref().unwrap_or_default().split_whitespace()
    }

    /// Extension parameters added to the request body.
    #[must_use]
    pub fn additional_parameters(&self) -> &BTreeMap<String, String> {
        &self.additional_parameters
    }
}
