use ravn::{
    configuration::ServiceConfiguration, request::TokenRequest, service::AuthorizationService,
};
use snafu::prelude::*;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

#[snafu::report]
#[tokio::main]
pub async fn main() -> Result<(), snafu::Whatever> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let issuer = std::env::var("ISSUER").whatever_context("Failed to get ISSUER")?;
    let client_id = std::env::var("CLIENT_ID").whatever_context("Failed to get CLIENT_ID")?;
    let client_secret =
        std::env::var("CLIENT_SECRET").whatever_context("Failed to get CLIENT_SECRET")?;
    let scope = std::env::var("SCOPE").ok();

    let http_client = reqwest::Client::new();

    let configuration = ServiceConfiguration::discover(issuer)
        .call(&http_client)
        .await
        .whatever_context("Failed to discover service configuration")?;

    let request = TokenRequest::builder()
        .configuration(configuration)
        .grant_type("client_credentials")
        .client_id(client_id)
        .client_secret(client_secret)
        .maybe_scope(scope)
        .build()
        .whatever_context("Failed to build token request")?;

    let (tx, rx) = oneshot::channel();
    AuthorizationService::new(http_client).perform(request, move |outcome| {
        let _ = tx.send(outcome);
    });

    let token_response = rx
        .await
        .whatever_context("Token request was dropped")?
        .whatever_context("Failed to get token")?;

    println!(
        "Access token: {}",
        token_response.access_token.expose_token()
    );

    Ok(())
}
