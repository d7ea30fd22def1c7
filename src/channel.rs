//! Secure channel to lnd: TLS always, macaroon per call when present.

use std::time::Duration;

use tonic::metadata::AsciiMetadataValue;
use tonic::service::interceptor::InterceptedService;
use tonic::service::Interceptor;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Status};
use zeroize::Zeroizing;

use crate::core::consts::rpc;
use crate::credentials::{Macaroon, TransportCredentials};
use crate::error::{BootstrapError, BootstrapResult};

/// Attaches the macaroon to every outgoing call.
///
/// Only the hex form is held, wiped on drop. The metadata value handed to
/// the transport is built per call and owned by the request from then on.
#[derive(Clone)]
pub struct MacaroonCredential {
    hex: Zeroizing<String>,
}

impl MacaroonCredential {
    pub fn new(macaroon: &Macaroon) -> BootstrapResult<Self> {
        let credential = Self { hex: macaroon.to_hex() };
        credential.metadata_value().map_err(|e| BootstrapError::config(format!("macaroon metadata: {e}")))?;
        Ok(credential)
    }

    fn metadata_value(&self) -> Result<AsciiMetadataValue, tonic::metadata::errors::InvalidMetadataValue> {
        AsciiMetadataValue::try_from(self.hex.as_str())
    }
}

impl std::fmt::Debug for MacaroonCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str("MacaroonCredential(***)") }
}

/// Per-call credential hook. A no-op on the init path.
#[derive(Debug, Clone, Default)]
pub struct CallCredentials {
    macaroon: Option<MacaroonCredential>,
}

impl CallCredentials {
    pub fn none() -> Self { Self::default() }
    pub fn macaroon(credential: MacaroonCredential) -> Self { Self { macaroon: Some(credential) } }
    pub fn is_authenticated(&self) -> bool { self.macaroon.is_some() }
}

impl Interceptor for CallCredentials {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        if let Some(cred) = &self.macaroon {
            let value = cred.metadata_value().map_err(|_| Status::internal("macaroon metadata"))?;
            request.metadata_mut().insert(rpc::MACAROON_METADATA_KEY, value);
        }
        Ok(request)
    }
}

pub type AuthenticatedChannel = InterceptedService<Channel, CallCredentials>;

/// Everything needed to dial. Immutable once built.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    address: String,
    domain: String,
    transport: TransportCredentials,
    call_credentials: CallCredentials,
    connect_timeout: Option<Duration>,
}

impl ChannelConfig {
    /// `address` is `host:port`; the TLS domain defaults to the host.
    pub fn new(address: impl Into<String>, transport: TransportCredentials) -> Self {
        let address = address.into();
        let domain = host_of(&address).to_string();
        Self { address, domain, transport, call_credentials: CallCredentials::none(), connect_timeout: None }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self { self.domain = domain.into(); self }
    pub fn with_macaroon(mut self, macaroon: &Macaroon) -> BootstrapResult<Self> {
        self.call_credentials = CallCredentials::macaroon(MacaroonCredential::new(macaroon)?);
        Ok(self)
    }
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self { self.connect_timeout = timeout; self }

    pub fn address(&self) -> &str { &self.address }
    pub fn domain(&self) -> &str { &self.domain }
    pub fn transport(&self) -> &TransportCredentials { &self.transport }
    pub fn call_credentials(&self) -> &CallCredentials { &self.call_credentials }
    pub fn connect_timeout(&self) -> Option<Duration> { self.connect_timeout }
    pub fn is_authenticated(&self) -> bool { self.call_credentials.is_authenticated() }

    /// `https://` only; the endpoint refuses to build without a TLS config.
    pub fn endpoint(&self) -> BootstrapResult<Endpoint> {
        let endpoint = Endpoint::from_shared(format!("https://{}", self.address))
            .map_err(|e| self.establish_error(e))?
            .tls_config(self.transport.tls_config(&self.domain))
            .map_err(|e| self.establish_error(e))?;
        Ok(match self.connect_timeout {
            Some(timeout) => endpoint.connect_timeout(timeout),
            None => endpoint,
        })
    }

    /// Dials eagerly: returns only once the connection is up or has failed.
    pub async fn connect(&self) -> BootstrapResult<AuthenticatedChannel> {
        tracing::info!(address = %self.address, domain = %self.domain, pinned = self.transport.is_pinned(), "Dialing lnd");
        let channel = self.endpoint()?.connect().await.map_err(|e| self.establish_error(e))?;
        Ok(InterceptedService::new(channel, self.call_credentials.clone()))
    }

    fn establish_error(&self, err: impl std::error::Error) -> BootstrapError {
        let mut reason = err.to_string();
        let mut source = err.source();
        while let Some(inner) = source {
            reason.push_str(": ");
            reason.push_str(&inner.to_string());
            source = inner.source();
        }
        BootstrapError::ChannelEstablish { address: self.address.clone(), reason }
    }
}

fn host_of(address: &str) -> &str {
    if let Some(rest) = address.strip_prefix('[') {
        // [::1]:10009
        return rest.split(']').next().unwrap_or(rest);
    }
    address.rsplit_once(':').map(|(host, _)| host).unwrap_or(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_crypto() {
        let _ = rustls::crypto::ring::default_provider().install_default();
    }

    fn sample_macaroon() -> Macaroon {
        let mut raw = vec![2u8, 2, 2, b'i', b'd', 0, 0, 6, 32];
        raw.extend_from_slice(&[1u8; 32]);
        Macaroon::from_binary(&raw).expect("macaroon")
    }

    #[test]
    fn test_domain_from_address() {
        assert_eq!(host_of("localhost:10009"), "localhost");
        assert_eq!(host_of("10.0.0.2:10009"), "10.0.0.2");
        assert_eq!(host_of("[::1]:10009"), "::1");
        assert_eq!(host_of("lnd"), "lnd");

        let config = ChannelConfig::new("lnd.internal:10009", TransportCredentials::WebPkiRoots);
        assert_eq!(config.domain(), "lnd.internal");
        assert_eq!(config.with_domain("localhost").domain(), "localhost");
    }

    #[test]
    fn test_interceptor_attaches_hex_macaroon() {
        let mac = sample_macaroon();
        let mut creds = CallCredentials::macaroon(MacaroonCredential::new(&mac).expect("cred"));
        let req = creds.call(Request::new(())).expect("intercept");
        let value = req.metadata().get(rpc::MACAROON_METADATA_KEY).expect("header");
        assert_eq!(value.to_str().expect("ascii"), mac.to_hex().as_str());
    }

    #[test]
    fn test_interceptor_without_macaroon_is_noop() {
        let mut creds = CallCredentials::none();
        let req = creds.call(Request::new(())).expect("intercept");
        assert!(req.metadata().get(rpc::MACAROON_METADATA_KEY).is_none());
    }

    #[test]
    fn test_config_carries_credentials() {
        init_crypto();
        let config = ChannelConfig::new("localhost:10009", TransportCredentials::WebPkiRoots);
        assert!(!config.is_authenticated());
        let config = config.with_macaroon(&sample_macaroon()).expect("macaroon");
        assert!(config.is_authenticated());
        assert!(config.endpoint().is_ok());
    }

    #[tokio::test]
    async fn test_connect_refused_is_establish_error() {
        init_crypto();
        // port 1 on loopback: nothing listens there
        let config = ChannelConfig::new("127.0.0.1:1", TransportCredentials::WebPkiRoots)
            .with_domain("localhost")
            .with_connect_timeout(Some(Duration::from_secs(2)));
        match config.connect().await {
            Err(BootstrapError::ChannelEstablish { address, .. }) => assert_eq!(address, "127.0.0.1:1"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("dial should fail"),
        }
    }
}
