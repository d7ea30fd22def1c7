//! Wallet gateway - the two remote operations behind a trait.
//!
//! `Connector` turns a `ChannelConfig` into a live gateway; the bootstrap
//! run only ever sees these two traits, so the gRPC client can be swapped
//! for a recording double in tests.

use async_trait::async_trait;

use crate::channel::{AuthenticatedChannel, ChannelConfig};
use crate::credentials::{Passphrase, RecoveryPhrase};
use crate::error::BootstrapResult;
use crate::lnrpc::wallet_unlocker_client::WalletUnlockerClient;
use crate::lnrpc::{InitWalletRequest, UnlockWalletRequest};
use crate::outcome::RemoteError;

/// InitWallet arguments.
#[derive(Debug, Clone)]
pub struct InitWallet {
    pub passphrase: Passphrase,
    pub recovery_phrase: RecoveryPhrase,
    pub seed_passphrase: Option<Passphrase>,
    pub recovery_window: Option<i32>,
}

/// UnlockWallet arguments.
#[derive(Debug, Clone)]
pub struct UnlockWallet {
    pub passphrase: Passphrase,
    pub recovery_window: Option<i32>,
}

#[async_trait]
pub trait WalletGateway: Send {
    async fn init_wallet(&mut self, request: InitWallet) -> Result<(), RemoteError>;
    async fn unlock_wallet(&mut self, request: UnlockWallet) -> Result<(), RemoteError>;
}

#[async_trait]
pub trait Connector: Send + Sync {
    type Gateway: WalletGateway;

    /// Must not return before the channel is established or has failed.
    async fn connect(&self, config: &ChannelConfig) -> BootstrapResult<Self::Gateway>;
}

/// lnd over tonic.
pub struct GrpcGateway {
    client: WalletUnlockerClient<AuthenticatedChannel>,
}

impl GrpcGateway {
    pub fn new(channel: AuthenticatedChannel) -> Self {
        Self { client: WalletUnlockerClient::new(channel) }
    }
}

#[async_trait]
impl WalletGateway for GrpcGateway {
    async fn init_wallet(&mut self, request: InitWallet) -> Result<(), RemoteError> {
        let req = InitWalletRequest {
            wallet_password: request.passphrase.expose().to_vec(),
            cipher_seed_mnemonic: request.recovery_phrase.words().to_vec(),
            aezeed_passphrase: request.seed_passphrase.as_ref().map(|p| p.expose().to_vec()).unwrap_or_default(),
            recovery_window: request.recovery_window.unwrap_or_default(),
        };
        self.client.init_wallet(req).await?;
        Ok(())
    }

    async fn unlock_wallet(&mut self, request: UnlockWallet) -> Result<(), RemoteError> {
        let req = UnlockWalletRequest {
            wallet_password: request.passphrase.expose().to_vec(),
            recovery_window: request.recovery_window.unwrap_or_default(),
        };
        self.client.unlock_wallet(req).await?;
        Ok(())
    }
}

/// Dials with `ChannelConfig::connect` and wraps the channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcConnector;

#[async_trait]
impl Connector for GrpcConnector {
    type Gateway = GrpcGateway;

    async fn connect(&self, config: &ChannelConfig) -> BootstrapResult<GrpcGateway> {
        Ok(GrpcGateway::new(config.connect().await?))
    }
}
