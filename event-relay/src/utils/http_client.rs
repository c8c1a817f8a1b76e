use std::sync::OnceLock;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::Result;
use crate::config::{ProxyMode, TransportConfig};

const USER_AGENT: &str = concat!("supervisor-event-relay/", env!("CARGO_PKG_VERSION"));

pub fn install_rustls_provider() {
    static PROVIDER_INSTALLED: OnceLock<()> = OnceLock::new();
    PROVIDER_INSTALLED.get_or_init(|| {
        if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
            // Safe to ignore: can happen if another crate installed it first.
            debug!(existing_provider = ?e, "rustls CryptoProvider already installed");
        }
    });
}

/// Apply `proxy` to an existing `reqwest::ClientBuilder`.
///
/// - `Disabled` => ignore env/system proxies
/// - `System` => reqwest defaults (env/system proxies)
/// - `Explicit` => route everything through the given proxy
pub fn apply_proxy(
    builder: reqwest::ClientBuilder,
    proxy: &ProxyMode,
) -> Result<reqwest::ClientBuilder> {
    Ok(match proxy {
        ProxyMode::Disabled => builder.no_proxy(),
        ProxyMode::System => builder,
        ProxyMode::Explicit(url) => builder.proxy(reqwest::Proxy::all(url)?),
    })
}

/// Build the client used by one HTTP channel.
pub fn build_client(transport: &TransportConfig) -> Result<Client> {
    install_rustls_provider();

    let mut builder = Client::builder().user_agent(USER_AGENT);
    if transport.timeout > Duration::ZERO {
        builder = builder.timeout(transport.timeout);
    }
    builder = apply_proxy(builder, &transport.proxy)?;

    Ok(builder.build()?)
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// POST `body` as JSON and read the full response.
///
/// Only transport failures are errors here; status interpretation is left to
/// the caller.
pub async fn post_json<T>(client: &Client, url: &str, body: &T) -> Result<HttpResponse>
where
    T: Serialize + ?Sized,
{
    let response = client.post(url).json(body).send().await?;
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Ok(HttpResponse { status, body })
}
