use snafu::Snafu;

/// Errors raised synchronously while building a
/// [`TokenRequest`](super::TokenRequest). No request is sent when
/// construction fails.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum ConstructionError {
    /// The `authorization_code` grant needs the code.
    #[snafu(display("authorization_code grant requires an authorization code"))]
    MissingAuthorizationCode,
    /// The `authorization_code` grant needs the redirect URL.
    #[snafu(display("authorization_code grant requires a redirect URL"))]
    MissingRedirectUrl,
    /// The `refresh_token` grant needs the refresh token.
    #[snafu(display("refresh_token grant requires a refresh token"))]
    MissingRefreshToken,
    /// A code verifier was given for a grant that does not use one.
    #[snafu(display("{grant_type} grant does not take a code verifier"))]
    CodeVerifierNotAllowed {
        /// The grant type of the request.
        grant_type: String,
    },
    /// An extension grant was named after a standard grant.
    #[snafu(display("`{grant_type}` is a standard grant, not an extension"))]
    StandardGrantAsExtension {
        /// The rejected name.
        grant_type: String,
    },
    /// The grant type was blank.
    #[snafu(display("grant type must not be empty"))]
    EmptyGrantType,
    /// An additional parameter would overwrite a standard one.
    #[snafu(display("additional parameter `{name}` collides with a reserved parameter"))]
    ReservedParameter {
        /// The offending parameter name.
        name: String,
    },
}

impl crate::Error for ConstructionError {
    fn is_retryable(&self) -> bool {
        false
    }
}
