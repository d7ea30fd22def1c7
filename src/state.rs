//! Wallet lifecycle detection from local credential files.

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletLifecycleState {
    /// No wallet from this client's point of view: cert or macaroon missing.
    Uninitialized,
    /// Both files present; the wallet exists and needs its passphrase.
    LockedExisting,
    /// Reported by lnd, never detected locally.
    Unlocked,
}

impl WalletLifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletLifecycleState::Uninitialized => "uninitialized",
            WalletLifecycleState::LockedExisting => "locked",
            WalletLifecycleState::Unlocked => "unlocked",
        }
    }
}

/// Result of one detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub state: WalletLifecycleState,
    pub cert_present: bool,
    pub macaroon_present: bool,
}

impl Detection {
    /// Exactly one of the two files exists.
    pub fn is_partial(&self) -> bool { self.cert_present != self.macaroon_present }
}

/// Pure classification of the two existence checks.
pub fn classify(cert_present: bool, macaroon_present: bool) -> WalletLifecycleState {
    if cert_present && macaroon_present {
        WalletLifecycleState::LockedExisting
    } else {
        WalletLifecycleState::Uninitialized
    }
}

pub fn detect(cert_path: &Path, macaroon_path: &Path) -> Detection {
    let cert_present = cert_path.exists();
    let macaroon_present = macaroon_path.exists();
    Detection { state: classify(cert_present, macaroon_present), cert_present, macaroon_present }
}
