//! Constants for env keys, lnrpc wire names and status lines
//!
//! Centralized so the CLI, the config layer and the classifier agree on
//! every string that crosses a process or network boundary.

/// Environment variables (also accepted from `.env`)
pub mod env {
    pub const CIPHER_SEED_MNEMONIC: &str = "CIPHER_SEED_MNEMONIC";
    pub const CIPHER_SEED_PASSPHRASE: &str = "CIPHER_SEED_PASSPHRASE";
    pub const WALLET_PASSWORD: &str = "WALLET_PASSWORD";
    pub const TLS_CERT_PATH: &str = "TLS_CERT_PATH";
    pub const MACAROON_PATH: &str = "MACAROON_PATH";
    pub const RPC_ADDRESS: &str = "LND_RPC_ADDRESS";
    pub const TLS_DOMAIN: &str = "LND_TLS_DOMAIN";
    pub const CONNECT_TIMEOUT_SECS: &str = "LND_CONNECT_TIMEOUT_SECS";
    pub const RECOVERY_WINDOW: &str = "LND_RECOVERY_WINDOW";
    pub const STRICT_DETECTION: &str = "LNBOOT_STRICT_DETECTION";
    pub const LOG_JSON: &str = "LNBOOT_LOG_JSON";

    pub const DOTENV_FILE: &str = ".env";
}

/// lnrpc.WalletUnlocker wire names
pub mod rpc {
    pub const DEFAULT_ADDRESS: &str = "localhost:10009";

    pub const UNLOCKER_SERVICE: &str = "lnrpc.WalletUnlocker";
    pub const INIT_WALLET: &str = "InitWallet";
    pub const UNLOCK_WALLET: &str = "UnlockWallet";
    pub const INIT_WALLET_PATH: &str = "/lnrpc.WalletUnlocker/InitWallet";
    pub const UNLOCK_WALLET_PATH: &str = "/lnrpc.WalletUnlocker/UnlockWallet";

    /// Per-call credential header; value is the hex of the raw macaroon.
    pub const MACAROON_METADATA_KEY: &str = "macaroon";

    /// Status description lnd returns once the unlocker service is torn down.
    pub const UNKNOWN_UNLOCKER_DESC: &str = "unknown service lnrpc.WalletUnlocker";
    /// The same signal as rendered text.
    pub const WALLET_ALREADY_UNLOCKED: &str =
        "rpc error: code = Unimplemented desc = unknown service lnrpc.WalletUnlocker";
}

/// Human-readable status lines
pub mod status {
    pub const CREATED: &str = "Created wallet successfully!";
    pub const UNLOCKED: &str = "wallet is unlocked successfully!";
    pub const ALREADY_UNLOCKED: &str = "wallet is unlocked already";
}
