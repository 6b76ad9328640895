//! TLS setup for the outbound chat connection.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::{debug, warn};

use crate::error::ClientError;

/// Build a client config trusting the platform's root certificates.
pub fn native_client_config() -> Result<ClientConfig, ClientError> {
    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for e in &certs.errors {
        warn!(error = %e, "Error loading native certs");
    }
    for cert in certs.certs {
        if let Err(e) = roots.add(cert) {
            warn!(error = %e, "Failed to add root cert");
        }
    }
    if roots.is_empty() {
        return Err(ClientError::Tls("no usable native root certificates".into()));
    }
    debug!(roots = roots.len(), "Loaded native root certificates");

    Ok(ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth())
}

/// Upgrades a TCP stream to TLS, verifying the server against `hostname`.
pub async fn upgrade_to_tls(
    tcp_stream: TcpStream,
    hostname: &str,
    config: Arc<ClientConfig>,
) -> Result<TlsStream<TcpStream>, ClientError> {
    let connector = TlsConnector::from(config);
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|e| ClientError::Tls(format!("invalid server name {hostname:?}: {e}")))?;

    connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(|e| ClientError::Tls(format!("handshake with {hostname} failed: {e}")))
}
