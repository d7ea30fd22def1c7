//! Bootstrap configuration - one immutable value threaded through the run

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::consts::{env as keys, rpc};
use crate::error::{BootstrapError, BootstrapResult};

/// Run configuration. The CLI or an embedding program constructs this.
#[derive(Clone)]
pub struct BootstrapConfig {
    pub rpc_address: String,
    pub tls_domain: Option<String>,
    pub tls_cert_path: PathBuf,
    pub macaroon_path: PathBuf,
    pub mnemonic: Option<String>,
    pub password: Option<String>,
    pub seed_passphrase: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub recovery_window: Option<i32>,
    pub strict_detection: bool,
}

impl BootstrapConfig {
    pub fn new(tls_cert_path: impl Into<PathBuf>, macaroon_path: impl Into<PathBuf>) -> Self {
        Self {
            rpc_address: rpc::DEFAULT_ADDRESS.to_string(),
            tls_domain: None,
            tls_cert_path: tls_cert_path.into(),
            macaroon_path: macaroon_path.into(),
            mnemonic: None,
            password: None,
            seed_passphrase: None,
            connect_timeout: None,
            recovery_window: None,
            strict_detection: false,
        }
    }
    pub fn with_rpc_address(mut self, a: impl Into<String>) -> Self { self.rpc_address = a.into(); self }
    pub fn with_tls_domain(mut self, d: impl Into<String>) -> Self { self.tls_domain = Some(d.into()); self }
    pub fn with_mnemonic(mut self, m: impl Into<String>) -> Self { self.mnemonic = Some(m.into()); self }
    pub fn with_password(mut self, p: impl Into<String>) -> Self { self.password = Some(p.into()); self }
    pub fn with_seed_passphrase(mut self, p: impl Into<String>) -> Self { self.seed_passphrase = Some(p.into()); self }
    pub fn with_connect_timeout(mut self, t: Duration) -> Self { self.connect_timeout = Some(t); self }
    pub fn with_recovery_window(mut self, w: i32) -> Self { self.recovery_window = Some(w); self }
    pub fn with_strict_detection(mut self, strict: bool) -> Self { self.strict_detection = strict; self }

    /// Reads the process environment (call `load_dotenv` first to honour `.env`).
    pub fn from_env() -> BootstrapResult<Self> {
        let cert = non_empty(keys::TLS_CERT_PATH)
            .ok_or_else(|| BootstrapError::config(format!("{} not set", keys::TLS_CERT_PATH)))?;
        let macaroon = non_empty(keys::MACAROON_PATH)
            .ok_or_else(|| BootstrapError::config(format!("{} not set", keys::MACAROON_PATH)))?;

        let mut config = Self::new(cert, macaroon);
        if let Some(address) = non_empty(keys::RPC_ADDRESS) {
            config.rpc_address = address;
        }
        config.tls_domain = non_empty(keys::TLS_DOMAIN);
        config.mnemonic = non_empty(keys::CIPHER_SEED_MNEMONIC);
        config.password = non_empty(keys::WALLET_PASSWORD);
        config.seed_passphrase = non_empty(keys::CIPHER_SEED_PASSPHRASE);
        if let Some(secs) = non_empty(keys::CONNECT_TIMEOUT_SECS) {
            config.connect_timeout = Some(parse_timeout(&secs)?);
        }
        if let Some(window) = non_empty(keys::RECOVERY_WINDOW) {
            config.recovery_window = Some(parse_recovery_window(&window)?);
        }
        config.strict_detection = non_empty(keys::STRICT_DETECTION).map(|v| parse_flag(&v)).unwrap_or(false);
        Ok(config)
    }
}

// Secrets stay out of Debug output.
impl fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("BootstrapConfig")
            .field("rpc_address", &self.rpc_address)
            .field("tls_domain", &self.tls_domain)
            .field("tls_cert_path", &self.tls_cert_path)
            .field("macaroon_path", &self.macaroon_path)
            .field("mnemonic", &redact(&self.mnemonic))
            .field("password", &redact(&self.password))
            .field("seed_passphrase", &redact(&self.seed_passphrase))
            .field("connect_timeout", &self.connect_timeout)
            .field("recovery_window", &self.recovery_window)
            .field("strict_detection", &self.strict_detection)
            .finish()
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

pub fn parse_timeout(value: &str) -> BootstrapResult<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(BootstrapError::config(format!("invalid connect timeout: {value:?}"))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
    }
}

pub fn parse_recovery_window(value: &str) -> BootstrapResult<i32> {
    value
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|w| *w >= 0)
        .ok_or_else(|| BootstrapError::config(format!("invalid recovery window: {value:?}")))
}

pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Loads `KEY=value` lines into the environment. Existing variables win;
/// blank lines and `#` comments are skipped. A missing file is not an error.
pub fn load_dotenv(path: &Path) -> BootstrapResult<usize> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(BootstrapError::config(format!("{}: {e}", path.display()))),
    };

    let mut loaded = 0;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !key.is_empty() && !value.is_empty() && env::var(key).is_err() {
                env::set_var(key, value);
                loaded += 1;
            }
        }
    }
    Ok(loaded)
}
