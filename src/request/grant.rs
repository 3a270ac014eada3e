use std::fmt;

use secrecy::SecretString;
use url::Url;

/// The grant type named in a token request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GrantType {
    /// `authorization_code` (RFC 6749 §4.1.3).
    AuthorizationCode,
    /// `client_credentials` (RFC 6749 §4.4.2).
    ClientCredentials,
    /// `refresh_token` (RFC 6749 §6).
    RefreshToken,
    /// An extension grant, identified by an absolute URI or a registered name.
    Extension(String),
}

impl GrantType {
    /// The value sent as `grant_type`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
            Self::Extension(grant_type) => grant_type,
        }
    }
}

impl From<&str> for GrantType {
    fn from(value: &str) -> Self {
        match value {
            "authorization_code" => Self::AuthorizationCode,
            "client_credentials" => Self::ClientCredentials,
            "refresh_token" => Self::RefreshToken,
            other => Self::Extension(other.to_owned()),
        }
    }
}

impl From<String> for GrantType {
    fn from(value: String) -> Self {
        match Self::from(value.as_str()) {
            Self::Extension(_) => Self::Extension(value),
            known => known,
        }
    }
}

impl fmt::Display for GrantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grant together with the fields that grant requires.
#[derive(Debug, Clone)]
pub enum Grant {
    /// Exchange an authorization code.
    AuthorizationCode {
        /// The code received on the redirect.
        code: String,
        /// The redirect URI used in the authorization request.
        redirect_url: Url,
        /// The PKCE code verifier, if a challenge was sent.
        code_verifier: Option<String>,
    },
    /// The client acts on its own behalf.
    ClientCredentials,
    /// Exchange a refresh token.
    RefreshToken {
        /// The refresh token.
        refresh_token: SecretString,
    },
    /// An extension grant. Its parameters travel as additional parameters.
    Extension {
        /// The `grant_type` value.
        grant_type: String,
    },
}

impl Grant {
    /// The grant type of this grant.
    #[must_use]
    pub fn grant_type(&self) -> GrantType {
        match self {
            Self::AuthorizationCode { .. } => GrantType::AuthorizationCode,
            Self::ClientCredentials => GrantType::ClientCredentials,
            Self::RefreshToken { .. } => GrantType::RefreshToken,
            Self::Extension { grant_type } => GrantType::Extension(grant_type.clone()),
        }
    }
}
