//! Token endpoint responses.

use std::{collections::HashMap, time::{Duration, SystemTime}};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::token::{AccessToken, RefreshToken};

/// The successful response from the token endpoint (RFC 6749 §5.1).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: AccessToken,
    /// The token type, usually `Bearer`. Empty if the server omitted it.
    #[serde(default)]
    pub token_type: String,
    /// The lifetime of the access token.
    #[serde(default, deserialize_with = "deserialize_expires_in")]
    pub expires_in: Option<Duration>,
    /// The refresh token.
    pub refresh_token: Option<RefreshToken>,
    /// The granted scopes, usually provided if different to requested scopes.
    pub scope: Option<String>,
    /// The ID token, usually provided with the `openid` scope.
    pub id_token: Option<String>,
    /// A synthetic field which is set to the time the response was decoded.
    #[serde(skip, default = "SystemTime::now")]
    pub received_at: SystemTime,
    /// Fields the token endpoint returned that are not modelled above.
    #[serde(flatten)]
    pub additional_parameters: HashMap<String, Value>,
}

impl TokenResponse {
    /// Gets a value from the unrecognized response fields.
    #[must_use]
    pub fn get_additional(&self, key: &str) -> Option<&Value> {
        self.additional_parameters.get(key)
    }

    /// The scopes granted, split on whitespace.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.as_deref().unwrap_or_default().split_whitespace()
    }

    /// The time at which the access token expires, if the server said.
    ///
    /// `None` also when the lifetime runs past what [`SystemTime`] can hold.
    #[must_use]
    pub fn expires_at(&self) -> Option<SystemTime> {
        self.expires_in
            .and_then(|expires_in| self.received_at.checked_add(expires_in))
    }

    /// Returns `true` if the access token has expired, or will within `margin`.
    ///
    /// Tokens without an `expires_in`, or with one too large to represent,
    /// never report as expired. A `margin` too large to represent covers any
    /// expiry.
    #[must_use]
    pub fn is_expired(&self, margin: Duration) -> bool {
        self.expires_at().is_some_and(|expires_at| {
            SystemTime::now()
                .checked_add(margin)
                .is_none_or(|deadline| deadline >= expires_at)
        })
    }
}

fn deserialize_expires_in<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Duration>, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
}

/// The error response from the token endpoint (RFC 6749 §5.2).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthErrorBody {
    /// The error code, e.g. `invalid_client`.
    pub error: String,
    /// Human-readable detail.
    pub error_description: Option<String>,
    /// A page describing the error.
    pub error_uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_response() {
        let response: TokenResponse = serde_json::from_str(
            r#"{
                "access_token": "tok123",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "ref456",
                "scope": "read write",
                "tenant": "acme"
            }"#,
        )
        .unwrap();

        assert_eq!(response.access_token.expose_token(), "tok123");
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, Some(Duration::from_secs(3600)));
        assert_eq!(
            response.refresh_token.as_ref().map(RefreshToken::expose_token),
            Some("ref456")
        );
        assert_eq!(response.scopes().collect::<Vec<_>>(), ["read", "write"]);
        assert_eq!(response.get_additional("tenant"), Some(&Value::from("acme")));
        assert!(response.get_additional("access_token").is_none());
        assert!(!response.is_expired(Duration::from_secs(60)));
    }

    #[test]
    fn decodes_minimal_response() {
        let response: TokenResponse = serde_json::from_str(r#"{"access_token":"t"}"#).unwrap();

        assert_eq!(response.token_type, "");
        assert!(response.expires_in.is_none());
        assert!(response.expires_at().is_none());
        assert!(!response.is_expired(Duration::ZERO));
        assert!(response.additional_parameters.is_empty());
    }

    #[test]
    fn short_lived_token_is_expired_within_margin() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"t","expires_in":30}"#).unwrap();

        assert!(response.is_expired(Duration::from_secs(60)));
        assert!(!response.is_expired(Duration::ZERO));
    }

    #[test]
    fn huge_lifetime_never_expires() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"t","expires_in":18446744073709551615}"#,
        )
        .unwrap();

        assert_eq!(response.expires_in, Some(Duration::from_secs(u64::MAX)));
        assert!(response.expires_at().is_none());
        assert!(!response.is_expired(Duration::from_secs(60)));
        assert!(!response.is_expired(Duration::MAX));
    }

    #[test]
    fn huge_margin_covers_any_expiry() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"t","expires_in":3600}"#).unwrap();

        assert!(response.is_expired(Duration::MAX));
    }

    #[test]
    fn missing_access_token_is_rejected() {
        assert!(serde_json::from_str::<TokenResponse>(r#"{"token_type":"Bearer"}"#).is_err());
    }
}
