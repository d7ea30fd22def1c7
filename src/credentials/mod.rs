//! Credentials - everything the run needs to talk to lnd
//!
//! Loaded once per run from the certificate path, the macaroon path and the
//! secrets in `BootstrapConfig`. Nothing here is written back to disk.
//!
//! | Piece | Source | Needed on |
//! |-------|--------|-----------|
//! | transport | `tls.cert` (PEM) | every path |
//! | token | `admin.macaroon` (binary) | unlock only |
//! | recovery phrase | `CIPHER_SEED_MNEMONIC` | init only |
//! | passphrase | `WALLET_PASSWORD` | every path |

mod macaroon;
mod tls;

pub use macaroon::{Caveat, Macaroon, MacaroonError, MacaroonVersion};
pub use tls::TransportCredentials;

use std::fmt;
use std::path::Path;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{BootstrapError, BootstrapResult};

/// Wallet passphrase. Wiped on drop, never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Passphrase(Vec<u8>);

impl Passphrase {
    pub fn new(secret: impl Into<Vec<u8>>) -> BootstrapResult<Self> {
        let bytes = secret.into();
        if bytes.is_empty() {
            return Err(BootstrapError::config("wallet passphrase is empty"));
        }
        Ok(Self(bytes))
    }

    pub fn expose(&self) -> &[u8] { &self.0 }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Passphrase(***)") }
}

/// Ordered recovery words, kept exactly as typed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RecoveryPhrase(Vec<String>);

impl RecoveryPhrase {
    /// Splits on whitespace. No case folding, no punctuation stripping.
    pub fn parse(phrase: &str) -> BootstrapResult<Self> {
        let words: Vec<String> = phrase.split_whitespace().map(str::to_owned).collect();
        if words.is_empty() {
            return Err(BootstrapError::config("recovery phrase is empty"));
        }
        Ok(Self(words))
    }

    pub fn words(&self) -> &[String] { &self.0 }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoveryPhrase({} words)", self.0.len())
    }
}

/// Credentials for one run.
#[derive(Debug)]
pub struct Credentials {
    pub transport: TransportCredentials,
    pub token: Option<Macaroon>,
    pub recovery_phrase: Option<RecoveryPhrase>,
    pub passphrase: Passphrase,
}

impl Credentials {
    /// Init path: transport + passphrase + recovery phrase, no token.
    pub fn for_init(
        transport: TransportCredentials,
        passphrase: Passphrase,
        recovery_phrase: RecoveryPhrase,
    ) -> Self {
        Self { transport, token: None, recovery_phrase: Some(recovery_phrase), passphrase }
    }

    /// Unlock path: transport + passphrase + token.
    pub fn for_unlock(transport: TransportCredentials, passphrase: Passphrase, token: Macaroon) -> Self {
        Self { transport, token: Some(token), recovery_phrase: None, passphrase }
    }
}

/// Reads and parses a macaroon file.
pub fn load_macaroon(path: &Path) -> BootstrapResult<Macaroon> {
    let fail = |source: MacaroonError| BootstrapError::TokenParse { path: path.to_path_buf(), source };
    let raw = Zeroizing::new(std::fs::read(path).map_err(|e| fail(e.into()))?);
    let macaroon = Macaroon::from_binary(&raw).map_err(fail)?;
    tracing::debug!(
        version = ?macaroon.version(),
        location = macaroon.location().unwrap_or(""),
        caveats = macaroon.caveats().len(),
        "Parsed macaroon"
    );
    Ok(macaroon)
}
