//! Bootstrap - one pass from local files to a terminal `Outcome`
//!
//! ```text
//! detect(cert, macaroon)
//!   ├── Uninitialized  → transport ─→ dial (TLS)            → InitWallet   → Created | Failed
//!   └── LockedExisting → transport + macaroon → dial (TLS+mac) → UnlockWallet → Unlocked | AlreadyUnlocked | Failed
//! ```
//!
//! Exactly one RPC per run. Every `BootstrapError` returns before the dial
//! or instead of the RPC, and nothing is written to disk on any path.

mod config;

pub use config::{load_dotenv, parse_flag, parse_recovery_window, parse_timeout, BootstrapConfig};

use tracing::{info, warn};

use crate::channel::ChannelConfig;
use crate::credentials::{load_macaroon, Credentials, Passphrase, RecoveryPhrase, TransportCredentials};
use crate::error::{BootstrapError, BootstrapResult};
use crate::gateway::{Connector, GrpcConnector, InitWallet, UnlockWallet, WalletGateway};
use crate::outcome::{classify_init, classify_unlock, Outcome};
use crate::state::{detect, Detection, WalletLifecycleState};

/// What a run decided and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub detected: WalletLifecycleState,
    pub outcome: Outcome,
}

impl Report {
    /// Wallet state after the run, as far as lnd told us.
    pub fn final_state(&self) -> WalletLifecycleState {
        if self.outcome.is_success() { WalletLifecycleState::Unlocked } else { self.detected }
    }
}

pub struct Bootstrap<C = GrpcConnector> {
    config: BootstrapConfig,
    connector: C,
}

impl Bootstrap<GrpcConnector> {
    pub fn new(config: BootstrapConfig) -> Self {
        Self { config, connector: GrpcConnector }
    }
}

impl<C: Connector> Bootstrap<C> {
    pub fn with_connector(config: BootstrapConfig, connector: C) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &BootstrapConfig { &self.config }

    pub async fn run(&self) -> BootstrapResult<Report> {
        let passphrase = Passphrase::new(
            self.config
                .password
                .as_deref()
                .ok_or_else(|| BootstrapError::config("wallet passphrase not set"))?,
        )?;

        let detection = self.detect()?;
        info!(state = detection.state.as_str(), "Detected wallet state");

        let outcome = match detection.state {
            WalletLifecycleState::Uninitialized => self.initialize(passphrase).await?,
            // detect never yields Unlocked; if it did, lnd answers the unlock with the benign error
            WalletLifecycleState::LockedExisting | WalletLifecycleState::Unlocked => self.unlock(passphrase).await?,
        };

        match &outcome {
            Outcome::Failed(reason) => warn!(%reason, "Wallet bootstrap failed"),
            ok => info!(outcome = ok.as_str(), "Wallet bootstrap finished"),
        }
        Ok(Report { detected: detection.state, outcome })
    }

    fn detect(&self) -> BootstrapResult<Detection> {
        let detection = detect(&self.config.tls_cert_path, &self.config.macaroon_path);
        if detection.is_partial() {
            let (present, missing) = if detection.cert_present {
                (&self.config.tls_cert_path, &self.config.macaroon_path)
            } else {
                (&self.config.macaroon_path, &self.config.tls_cert_path)
            };
            if self.config.strict_detection {
                return Err(BootstrapError::config(format!(
                    "partial credential layout: {} exists but {} is missing",
                    present.display(),
                    missing.display()
                )));
            }
            warn!(present = %present.display(), missing = %missing.display(), "Partial credential layout, treating wallet as uninitialized");
        }
        Ok(detection)
    }

    async fn initialize(&self, passphrase: Passphrase) -> BootstrapResult<Outcome> {
        let phrase = self
            .config
            .mnemonic
            .as_deref()
            .ok_or_else(|| BootstrapError::config("recovery phrase not set"))?;
        let recovery_phrase = RecoveryPhrase::parse(phrase)?;
        let seed_passphrase = self.config.seed_passphrase.as_deref().map(Passphrase::new).transpose()?;

        let transport = TransportCredentials::load_or_roots(&self.config.tls_cert_path)?;
        let credentials = Credentials::for_init(transport, passphrase, recovery_phrase);
        let channel = self.channel_config(&credentials)?;

        let mut gateway = self.connector.connect(&channel).await?;
        let Credentials { passphrase, recovery_phrase, .. } = credentials;
        let recovery_phrase = recovery_phrase.ok_or_else(|| BootstrapError::config("recovery phrase not set"))?;
        info!(words = recovery_phrase.len(), "Initializing wallet");
        let result = gateway
            .init_wallet(InitWallet {
                passphrase,
                recovery_phrase,
                seed_passphrase,
                recovery_window: self.config.recovery_window,
            })
            .await;
        Ok(classify_init(result))
    }

    async fn unlock(&self, passphrase: Passphrase) -> BootstrapResult<Outcome> {
        let transport = TransportCredentials::load_pem(&self.config.tls_cert_path)?;
        let token = load_macaroon(&self.config.macaroon_path)?;
        let credentials = Credentials::for_unlock(transport, passphrase, token);
        let channel = self.channel_config(&credentials)?;

        let mut gateway = self.connector.connect(&channel).await?;
        let Credentials { passphrase, .. } = credentials;
        info!("Unlocking wallet");
        let result = gateway
            .unlock_wallet(UnlockWallet {
                passphrase,
                recovery_window: self.config.recovery_window,
            })
            .await;
        Ok(classify_unlock(result))
    }

    fn channel_config(&self, credentials: &Credentials) -> BootstrapResult<ChannelConfig> {
        let mut channel = ChannelConfig::new(&self.config.rpc_address, credentials.transport.clone())
            .with_connect_timeout(self.config.connect_timeout);
        if let Some(domain) = &self.config.tls_domain {
            channel = channel.with_domain(domain);
        }
        match &credentials.token {
            Some(token) => channel.with_macaroon(token),
            None => Ok(channel),
        }
    }
}
