//! PKCE (RFC 7636) verifier and challenge generation.
//!
//! The verifier goes into an `authorization_code`
//! [`TokenRequest`](crate::request::TokenRequest) as `code_verifier`; the
//! challenge goes into the authorization request that preceded it.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// A PKCE verifier and its `S256` challenge.
#[derive(Debug, Clone)]
pub struct Pkce {
    /// The code verifier.
    pub verifier: String,
    /// The code challenge.
    pub challenge: String,
}

impl Pkce {
    /// The `code_challenge_method` value for challenges from this type.
    pub const METHOD: &'static str = "S256";

    /// Generates a random verifier from 32 bytes of entropy and its `S256`
    /// challenge.
    #[must_use]
    pub fn generate_s256_pair() -> Self {
        let mut verifier_bytes = [0u8; 32];
        rand::rng().fill_bytes(&mut verifier_bytes);
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);
        let challenge = Self::s256_challenge(&verifier);

        Self {
            verifier,
            challenge,
        }
    }

    /// Computes `BASE64URL(SHA256(ASCII(verifier)))`.
    #[must_use]
    pub fn s256_challenge(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }
}
