//! lnboot: one-shot LND wallet bootstrap. Detect, then init or unlock.
//!
//! # Architecture
//!
//! ```text
//! BootstrapConfig (env / .env / flags)
//!   │
//!   ├── state::detect          tls.cert? admin.macaroon? → lifecycle state
//!   │
//!   ├── credentials            PEM cert, macaroon (v1/v2 binary), secrets
//!   │
//!   ├── channel                TLS endpoint + per-call macaroon interceptor
//!   │
//!   ├── gateway                WalletGateway trait → lnrpc.WalletUnlocker
//!   │
//!   └── outcome                Created | Unlocked | AlreadyUnlocked | Failed
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use lnboot::{Bootstrap, BootstrapConfig};
//!
//! let config = BootstrapConfig::new("/lnd/tls.cert", "/lnd/data/chain/bitcoin/mainnet/admin.macaroon")
//!     .with_password("wallet password")
//!     .with_mnemonic("abandon ability able ...");
//! let report = Bootstrap::new(config).run().await?;
//! println!("{}", report.outcome);
//! ```

pub mod bootstrap;
pub mod channel;
pub mod core;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod lnrpc;
pub mod logging;
pub mod outcome;
pub mod state;

pub use bootstrap::{Bootstrap, BootstrapConfig, Report};
pub use channel::{ChannelConfig, CallCredentials};
pub use credentials::{Credentials, Macaroon, Passphrase, RecoveryPhrase, TransportCredentials};
pub use error::{BootstrapError, BootstrapResult};
pub use gateway::{Connector, GrpcConnector, GrpcGateway, InitWallet, UnlockWallet, WalletGateway};
pub use outcome::{classify_init, classify_unlock, Outcome, RemoteError};
pub use state::{Detection, WalletLifecycleState};
