//! Transport credentials: the node's pinned TLS certificate.

use std::path::{Path, PathBuf};

use tonic::transport::{Certificate, ClientTlsConfig};

use crate::error::{BootstrapError, BootstrapResult};

/// TLS trust anchor for the channel. There is no plaintext variant.
#[derive(Debug, Clone)]
pub enum TransportCredentials {
    /// lnd's self-signed `tls.cert`, pinned as the only trusted root.
    Pinned { path: PathBuf, pem: Vec<u8> },
    /// Bundled WebPKI roots. Used only when no certificate is on disk yet,
    /// which happens on the init path before lnd has written one locally.
    WebPkiRoots,
}

impl TransportCredentials {
    /// Reads and validates a PEM certificate. The file must hold at least one
    /// `CERTIFICATE` block and every block must parse as X.509.
    pub fn load_pem(path: &Path) -> BootstrapResult<Self> {
        let fail = |reason: String| BootstrapError::TransportCredential { path: path.to_path_buf(), reason };

        let pem = std::fs::read(path).map_err(|e| fail(format!("read: {e}")))?;
        let certs = rustls_pemfile::certs(&mut pem.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| fail(format!("pem: {e}")))?;
        if certs.is_empty() {
            return Err(fail("no CERTIFICATE block".into()));
        }
        for der in &certs {
            x509_parser::parse_x509_certificate(der.as_ref())
                .map_err(|e| fail(format!("x509: {e}")))?;
        }

        Ok(TransportCredentials::Pinned { path: path.to_path_buf(), pem })
    }

    /// Pinned certificate when the file exists; WebPKI roots otherwise.
    pub fn load_or_roots(path: &Path) -> BootstrapResult<Self> {
        if path.exists() {
            return Self::load_pem(path);
        }
        // lnd's own certificate is self-signed, so this handshake only works
        // behind a proxy holding a publicly trusted certificate
        tracing::warn!(
            path = %path.display(),
            "No tls certificate on disk, trusting WebPKI roots; a self-signed lnd certificate will fail the handshake"
        );
        Ok(TransportCredentials::WebPkiRoots)
    }

    pub fn is_pinned(&self) -> bool { matches!(self, TransportCredentials::Pinned { .. }) }

    pub fn tls_config(&self, domain: &str) -> ClientTlsConfig {
        let tls = ClientTlsConfig::new().domain_name(domain.to_string());
        match self {
            TransportCredentials::Pinned { pem, .. } => tls.ca_certificate(Certificate::from_pem(pem)),
            TransportCredentials::WebPkiRoots => tls.with_webpki_roots(),
        }
    }
}
