//! Token values returned by the token endpoint.
//!
//! Both token types keep their value in a [`SecretString`](secrecy::SecretString)
//! so that `Debug` output and logs never contain the token itself.

mod access_token;
mod refresh_token;

pub use access_token::AccessToken;
pub use refresh_token::RefreshToken;
