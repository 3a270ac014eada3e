use bytes::Bytes;
use http::{
    HeaderValue, Method, Request,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, InvalidHeaderValue},
};
use secrecy::ExposeSecret as _;
use snafu::prelude::*;

use super::{ClientAuthMethod, Grant, TokenRequest, client_auth::basic_authorization};

impl TokenRequest {
    /// Encodes the request as an HTTP `POST` to the token endpoint.
    ///
    /// The body is `application/x-www-form-urlencoded`. Fields appear in a
    /// fixed order followed by the additional parameters sorted by name, so
    /// encoding the same request twice yields identical bytes.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if the form or the `Authorization` header
    /// cannot be serialized.
    pub fn to_http_request(&self) -> Result<Request<Bytes>, EncodeError> {
        let grant_type = self.grant.grant_type();
        let mut pairs: Vec<(&str, &str)> = vec![("grant_type", grant_type.as_str())];

        match &self.grant {
            Grant::AuthorizationCode {
                code,
                redirect_url,
                code_verifier,
            } => {
                pairs.push(("code", code));
                pairs.push(("redirect_uri", redirect_url.as_str()));
                if let Some(code_verifier) = code_verifier {
                    pairs.push(("code_verifier", code_verifier));
                }
            }
            Grant::RefreshToken { refresh_token } => {
                pairs.push(("refresh_token", refresh_token.expose_secret()));
            }
            Grant::ClientCredentials | Grant::Extension { .. } => {}
        }

        if let Some(scope) = &self.scope {
            pairs.push(("scope", scope));
        }

        let (mut parts, ()) = Request::new(()).into_parts();
        parts.method = Method::POST;
        parts.uri = self.token_endpoint().as_uri().clone();

        match (self.client_auth_method, &self.client_secret) {
            (ClientAuthMethod::ClientSecretBasic, Some(client_secret)) => {
                parts.headers.insert(
                    AUTHORIZATION,
                    basic_authorization(&self.client_id, client_secret)
                        .context(BadHeaderSnafu)?,
                );
            }
            (_, client_secret) => {
                pairs.push(("client_id", &self.client_id));
                if let Some(client_secret) = client_secret {
                    pairs.push(("client_secret", client_secret.expose_secret()));
                }
            }
        }

        pairs.extend(
            self.additional_parameters
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        );

        let body = serde_html_form::to_string(&pairs).context(SerializeFormSnafu)?;

        parts.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        parts
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Request::from_parts(parts, body.into()))
    }
}

/// Errors raised while encoding a token request.
#[derive(Debug, Snafu)]
pub enum EncodeError {
    /// The form parameters could not be serialized.
    #[snafu(display("Failed to serialize token request form"))]
    SerializeForm {
        /// The underlying error.
        source: serde_html_form::ser::Error,
    },
    /// The computed header value was invalid.
    #[snafu(display("Invalid header value"))]
    BadHeader {
        /// The underlying error.
        source: InvalidHeaderValue,
    },
}

impl crate::Error for EncodeError {
    fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use url::{Url, form_urlencoded};

    use super::*;
    use crate::{configuration::ServiceConfiguration, request::GrantType};

    fn configuration() -> ServiceConfiguration {
        ServiceConfiguration::builder()
            .authorization_endpoint("https://auth.example.com/authorize")
            .unwrap()
            .token_endpoint("https://auth.example.com/oauth2/token")
            .unwrap()
            .build()
    }

    fn form(request: &Request<Bytes>) -> Vec<(String, String)> {
        form_urlencoded::parse(request.body())
            .into_owned()
            .collect()
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn client_credentials_wire_format() {
        let request = TokenRequest::builder()
            .configuration(configuration())
            .grant_type("client_credentials")
            .client_id("abc")
            .client_secret("secret")
            .scope("read")
            .build()
            .unwrap()
            .to_http_request()
            .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.uri().to_string(),
            "https://auth.example.com/oauth2/token"
        );
        assert_eq!(
            request.headers()[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        assert_eq!(
            request.body().as_ref(),
            b"grant_type=client_credentials&scope=read&client_id=abc&client_secret=secret"
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let token_request = TokenRequest::builder()
            .configuration(configuration())
            .grant_type("client_credentials")
            .client_id("abc")
            .additional_parameters(BTreeMap::from([
                ("resource".to_string(), "b".to_string()),
                ("audience".to_string(), "a".to_string()),
            ]))
            .build()
            .unwrap();

        let first = token_request.to_http_request().unwrap();
        let second = token_request.to_http_request().unwrap();

        assert_eq!(first.body(), second.body());
        assert_eq!(first.headers(), second.headers());
        assert_eq!(first.uri(), second.uri());
    }

    #[test]
    fn authorization_code_round_trips_through_the_form() {
        let redirect_url = Url::parse("com.example.app:/oauth2redirect?x=1&y=2").unwrap();
        let request = TokenRequest::builder()
            .configuration(configuration())
            .grant_type(GrantType::AuthorizationCode)
            .authorization_code("c/o+d=e")
            .redirect_url(redirect_url.clone())
            .code_verifier("v~erifier")
            .client_id("my client")
            .scope("openid profile")
            .additional_parameters(BTreeMap::from([(
                "nonce".to_string(),
                "a&b=c".to_string(),
            )]))
            .build()
            .unwrap()
            .to_http_request()
            .unwrap();

        assert_eq!(
            form(&request),
            [
                pair("grant_type", "authorization_code"),
                pair("code", "c/o+d=e"),
                pair("redirect_uri", redirect_url.as_str()),
                pair("code_verifier", "v~erifier"),
                pair("scope", "openid profile"),
                pair("client_id", "my client"),
                pair("nonce", "a&b=c"),
            ]
        );
    }

    #[test]
    fn refresh_token_is_sent() {
        let request = TokenRequest::builder()
            .configuration(configuration())
            .grant_type("refresh_token")
            .refresh_token("rt-1")
            .client_id("abc")
            .build()
            .unwrap()
            .to_http_request()
            .unwrap();

        assert_eq!(
            form(&request),
            [
                pair("grant_type", "refresh_token"),
                pair("refresh_token", "rt-1"),
                pair("client_id", "abc"),
            ]
        );
    }

    #[test]
    fn empty_values_are_kept() {
        let request = TokenRequest::builder()
            .configuration(configuration())
            .grant_type("client_credentials")
            .client_id("")
            .client_secret("")
            .scope("")
            .build()
            .unwrap()
            .to_http_request()
            .unwrap();

        assert_eq!(
            form(&request),
            [
                pair("grant_type", "client_credentials"),
                pair("scope", ""),
                pair("client_id", ""),
                pair("client_secret", ""),
            ]
        );
    }

    #[test]
    fn basic_auth_moves_credentials_to_header() {
        let request = TokenRequest::builder()
            .configuration(configuration())
            .grant_type("client_credentials")
            .client_id("abc")
            .client_secret("secret")
            .client_auth_method(ClientAuthMethod::ClientSecretBasic)
            .build()
            .unwrap()
            .to_http_request()
            .unwrap();

        assert_eq!(request.headers()[AUTHORIZATION], "Basic YWJjOnNlY3JldA==");
        assert_eq!(form(&request), [pair("grant_type", "client_credentials")]);
    }

    #[test]
    fn basic_auth_without_secret_sends_client_id() {
        let request = TokenRequest::builder()
            .configuration(configuration())
            .grant_type("client_credentials")
            .client_id("public")
            .client_auth_method(ClientAuthMethod::ClientSecretBasic)
            .build()
            .unwrap()
            .to_http_request()
            .unwrap();

        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert_eq!(
            form(&request),
            [
                pair("grant_type", "client_credentials"),
                pair("client_id", "public"),
            ]
        );
    }

    #[test]
    fn extension_grant_name_is_sent_verbatim() {
        let request = TokenRequest::for_grant(Grant::Extension {
            grant_type: "urn:ietf:params:oauth:grant-type:jwt-bearer".to_string(),
        })
        .configuration(configuration())
        .client_id("abc")
        .additional_parameters(BTreeMap::from([(
            "assertion".to_string(),
            "eyJ.x.y".to_string(),
        )]))
        .build()
        .unwrap()
        .to_http_request()
        .unwrap();

        assert_eq!(
            form(&request),
            [
                pair("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                pair("client_id", "abc"),
                pair("assertion", "eyJ.x.y"),
            ]
        );
    }
}
