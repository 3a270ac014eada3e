use base64::prelude::*;
use http::{HeaderValue, header::InvalidHeaderValue};
use secrecy::{ExposeSecret as _, SecretString};
use url::form_urlencoded::byte_serialize;

/// How the client secret is presented to the token endpoint.
///
/// Requests without a client secret always send `client_id` in the body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ClientAuthMethod {
    /// `client_id` and `client_secret` are sent in the request body.
    #[default]
    ClientSecretPost,
    /// `client_id` and `client_secret` are sent in an `Authorization: Basic`
    /// header (RFC 6749 §2.3.1).
    ClientSecretBasic,
}

impl ClientAuthMethod {
    /// The discovery metadata value for this method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientSecretPost => "client_secret_post",
            Self::ClientSecretBasic => "client_secret_basic",
        }
    }
}

/// Both halves are form-encoded before joining, as RFC 6749 §2.3.1 requires.
pub(super) fn basic_authorization(
    client_id: &str,
    client_secret: &SecretString,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let client_id: String = byte_serialize(client_id.as_bytes()).collect();
    let client_secret: String = byte_serialize(client_secret.expose_secret().as_bytes()).collect();

    let credentials = format!("{client_id}:{client_secret}");
    let mut value = HeaderValue::try_from(format!(
        "Basic {}",
        BASE64_STANDARD.encode(credentials.as_bytes())
    ))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_credentials_are_form_encoded_then_base64() {
        let value = basic_authorization("my client", &SecretString::from("p@ss:word")).unwrap();
        let encoded = value.to_str().unwrap().strip_prefix("Basic ").unwrap();
        let decoded = String::from_utf8(BASE64_STANDARD.decode(encoded).unwrap()).unwrap();

        assert_eq!(decoded, "my+client:p%40ss%3Aword");
        assert!(value.is_sensitive());
    }

    #[test]
    fn method_names_match_discovery_metadata() {
        assert_eq!(ClientAuthMethod::default().as_str(), "client_secret_post");
        assert_eq!(
            ClientAuthMethod::ClientSecretBasic.as_str(),
            "client_secret_basic"
        );
    }
}
