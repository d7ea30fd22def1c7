//! lnboot CLI - bring an lnd wallet to the unlocked state, once
//!
//!   lnboot                         → detect, then InitWallet or UnlockWallet
//!   lnboot --json                  → same, machine-readable result on stdout
//!
//! Every flag falls back to an environment variable, and `.env` in the
//! working directory is loaded first (existing variables win):
//!   CIPHER_SEED_MNEMONIC, WALLET_PASSWORD, TLS_CERT_PATH, MACAROON_PATH,
//!   LND_RPC_ADDRESS, LND_TLS_DOMAIN, LND_CONNECT_TIMEOUT_SECS,
//!   CIPHER_SEED_PASSPHRASE, LND_RECOVERY_WINDOW, LNBOOT_STRICT_DETECTION
//!
//! Exit status: 0 for created / unlocked / already unlocked, 1 otherwise.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use lnboot::bootstrap::{load_dotenv, parse_flag, parse_recovery_window, parse_timeout};
use lnboot::core::consts::{env, rpc};
use lnboot::logging::init_logging;
use lnboot::{Bootstrap, BootstrapConfig, BootstrapError, Report};
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "lnboot", version, about = "Initialize or unlock an lnd wallet over gRPC")]
struct Args {
    /// Recovery phrase, whitespace separated (init only)
    #[arg(long, short = 'm', env = env::CIPHER_SEED_MNEMONIC, hide_env_values = true)]
    mnemonic: Option<String>,

    /// Wallet passphrase
    #[arg(long, short = 'p', env = env::WALLET_PASSWORD, hide_env_values = true)]
    password: Option<String>,

    /// Path to lnd's tls.cert
    #[arg(long = "tls-cert", env = env::TLS_CERT_PATH)]
    tls_cert: Option<PathBuf>,

    /// Path to the admin macaroon
    #[arg(long, env = env::MACAROON_PATH)]
    macaroon: Option<PathBuf>,

    /// lnd gRPC endpoint, host:port
    #[arg(long = "rpc-address", env = env::RPC_ADDRESS, default_value = rpc::DEFAULT_ADDRESS)]
    rpc_address: String,

    /// TLS server name (defaults to the endpoint host)
    #[arg(long = "tls-domain", env = env::TLS_DOMAIN)]
    tls_domain: Option<String>,

    /// Dial timeout in seconds (default: transport default)
    #[arg(long = "connect-timeout", env = env::CONNECT_TIMEOUT_SECS, value_parser = timeout_arg)]
    connect_timeout: Option<Duration>,

    /// aezeed passphrase for the recovery phrase (init only)
    #[arg(long = "seed-passphrase", env = env::CIPHER_SEED_PASSPHRASE, hide_env_values = true)]
    seed_passphrase: Option<String>,

    /// Address look-ahead for rescans
    #[arg(long = "recovery-window", env = env::RECOVERY_WINDOW, value_parser = recovery_window_arg)]
    recovery_window: Option<i32>,

    /// Refuse to re-initialize when only one of tls.cert / macaroon exists
    #[arg(long = "strict-detection")]
    strict_detection: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

fn timeout_arg(value: &str) -> Result<Duration, String> {
    parse_timeout(value).map_err(|e| e.to_string())
}

fn recovery_window_arg(value: &str) -> Result<i32, String> {
    parse_recovery_window(value).map_err(|e| e.to_string())
}

impl Args {
    fn into_config(self) -> Result<BootstrapConfig, BootstrapError> {
        let tls_cert = self
            .tls_cert
            .ok_or_else(|| BootstrapError::config(format!("{} not set", env::TLS_CERT_PATH)))?;
        let macaroon = self
            .macaroon
            .ok_or_else(|| BootstrapError::config(format!("{} not set", env::MACAROON_PATH)))?;

        let strict = self.strict_detection
            || std::env::var(env::STRICT_DETECTION).map(|v| parse_flag(&v)).unwrap_or(false);

        let mut config = BootstrapConfig::new(tls_cert, macaroon)
            .with_rpc_address(self.rpc_address)
            .with_strict_detection(strict);
        config.tls_domain = self.tls_domain;
        config.mnemonic = self.mnemonic;
        config.password = self.password;
        config.seed_passphrase = self.seed_passphrase;
        config.connect_timeout = self.connect_timeout;
        config.recovery_window = self.recovery_window;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let dotenv = load_dotenv(Path::new(env::DOTENV_FILE));
    init_logging();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let args = Args::parse();
    let (json_mode, pretty) = (args.json, args.pretty || io::stdout().is_terminal());

    let result = match dotenv {
        Ok(loaded) => {
            debug!(loaded, "Loaded .env");
            run(args).await
        }
        Err(e) => Err(anyhow::Error::new(e).context("cannot load .env")),
    };

    match result {
        Ok(report) => {
            if json_mode {
                println!("{}", render(&report_json(&report), pretty));
            } else {
                println!("{}", report.outcome);
            }
            if !report.outcome.is_success() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            if json_mode {
                let kind = e.downcast_ref::<BootstrapError>().map(BootstrapError::kind).unwrap_or("internal");
                eprintln!("{}", render(&json!({"error": kind, "message": format!("{e:#}")}), pretty));
            } else {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(1);
        }
    }
}

async fn run(args: Args) -> anyhow::Result<Report> {
    let config = args.into_config()?;
    debug!(?config, "Bootstrap config");
    let address = config.rpc_address.clone();
    let report = Bootstrap::new(config)
        .run()
        .await
        .with_context(|| format!("wallet bootstrap against {address}"))?;
    Ok(report)
}

fn report_json(report: &Report) -> Value {
    let mut value = serde_json::to_value(&report.outcome).unwrap_or_else(|_| json!({}));
    value["detected"] = json!(report.detected.as_str());
    value["state"] = json!(report.final_state().as_str());
    value
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}
