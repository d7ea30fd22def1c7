//! Fatal bootstrap errors. Each one aborts the run before (or instead of) the RPC.

use std::path::PathBuf;

use crate::credentials::MacaroonError;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Missing or unusable inputs: secrets, paths, flags.
    #[error("configuration: {0}")]
    Configuration(String),
    #[error("cannot load tls certificate {path}: {reason}")]
    TransportCredential { path: PathBuf, reason: String },
    #[error("cannot parse macaroon {path}: {source}")]
    TokenParse {
        path: PathBuf,
        #[source]
        source: MacaroonError,
    },
    #[error("cannot dial lnd at {address}: {reason}")]
    ChannelEstablish { address: String, reason: String },
}

impl BootstrapError {
    pub fn config(msg: impl Into<String>) -> Self {
        BootstrapError::Configuration(msg.into())
    }

    /// Short machine-readable kind, used by the `--json` output.
    pub fn kind(&self) -> &'static str {
        match self {
            BootstrapError::Configuration(_) => "configuration",
            BootstrapError::TransportCredential { .. } => "transport_credential",
            BootstrapError::TokenParse { .. } => "token_parse",
            BootstrapError::ChannelEstablish { .. } => "channel_establish",
        }
    }
}

pub type BootstrapResult<T> = Result<T, BootstrapError>;
