//! Outcome - what a run reports, and how raw RPC results map onto it.

use std::fmt;

use serde::Serialize;
use tonic::Code;

use crate::core::consts::{rpc, status};

/// A failed RPC as lnd reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// gRPC status with a code.
    Status { code: Code, message: String },
    /// Error text with no structured code attached.
    Message(String),
}

impl RemoteError {
    pub fn status(code: Code, message: impl Into<String>) -> Self {
        RemoteError::Status { code, message: message.into() }
    }

    /// Structured signal that the unlocker service no longer exists.
    fn is_unlocker_gone(&self) -> bool {
        match self {
            RemoteError::Status { code, message } => {
                *code == Code::Unimplemented && message == rpc::UNKNOWN_UNLOCKER_DESC
            }
            RemoteError::Message(text) => text == rpc::WALLET_ALREADY_UNLOCKED,
        }
    }
}

impl From<tonic::Status> for RemoteError {
    fn from(status: tonic::Status) -> Self {
        RemoteError::Status { code: status.code(), message: status.message().to_string() }
    }
}

/// Renders the way lnd's own clients print a status error.
impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Status { code, message } => {
                write!(f, "rpc error: code = {} desc = {}", code_name(*code), message)
            }
            RemoteError::Message(text) => f.write_str(text),
        }
    }
}

impl std::error::Error for RemoteError {}

fn code_name(code: Code) -> &'static str {
    match code {
        Code::Ok => "OK",
        Code::Cancelled => "Canceled",
        Code::Unknown => "Unknown",
        Code::InvalidArgument => "InvalidArgument",
        Code::DeadlineExceeded => "DeadlineExceeded",
        Code::NotFound => "NotFound",
        Code::AlreadyExists => "AlreadyExists",
        Code::PermissionDenied => "PermissionDenied",
        Code::ResourceExhausted => "ResourceExhausted",
        Code::FailedPrecondition => "FailedPrecondition",
        Code::Aborted => "Aborted",
        Code::OutOfRange => "OutOfRange",
        Code::Unimplemented => "Unimplemented",
        Code::Internal => "Internal",
        Code::Unavailable => "Unavailable",
        Code::DataLoss => "DataLoss",
        Code::Unauthenticated => "Unauthenticated",
    }
}

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Created,
    Unlocked,
    AlreadyUnlocked,
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool { !matches!(self, Outcome::Failed(_)) }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Created => "created",
            Outcome::Unlocked => "unlocked",
            Outcome::AlreadyUnlocked => "already_unlocked",
            Outcome::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created => f.write_str(status::CREATED),
            Outcome::Unlocked => f.write_str(status::UNLOCKED),
            Outcome::AlreadyUnlocked => f.write_str(status::ALREADY_UNLOCKED),
            Outcome::Failed(reason) => write!(f, "wallet bootstrap failed: {}", reason),
        }
    }
}

/// InitWallet has no benign failure: any error is reported verbatim.
pub fn classify_init(result: Result<(), RemoteError>) -> Outcome {
    match result {
        Ok(()) => Outcome::Created,
        Err(e) => Outcome::Failed(format!("cannot create wallet: {}", e)),
    }
}

/// UnlockWallet: a vanished unlocker service means lnd already unlocked.
pub fn classify_unlock(result: Result<(), RemoteError>) -> Outcome {
    match result {
        Ok(()) => Outcome::Unlocked,
        Err(e) if e.is_unlocker_gone() => Outcome::AlreadyUnlocked,
        Err(e) => Outcome::Failed(format!("cannot unlock wallet: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlock_success() {
        assert_eq!(classify_unlock(Ok(())), Outcome::Unlocked);
    }

    #[test]
    fn test_exact_text_is_already_unlocked() {
        let err = RemoteError::Message(rpc::WALLET_ALREADY_UNLOCKED.to_string());
        assert_eq!(classify_unlock(Err(err)), Outcome::AlreadyUnlocked);
    }

    #[test]
    fn test_structured_status_is_already_unlocked() {
        let status = tonic::Status::unimplemented(rpc::UNKNOWN_UNLOCKER_DESC);
        let err = RemoteError::from(status);
        assert_eq!(err.to_string(), rpc::WALLET_ALREADY_UNLOCKED);
        assert_eq!(classify_unlock(Err(err)), Outcome::AlreadyUnlocked);
    }

    #[test]
    fn test_near_misses_fail() {
        let cases = [
            RemoteError::Message(format!("{} ", rpc::WALLET_ALREADY_UNLOCKED)),
            RemoteError::Message(rpc::WALLET_ALREADY_UNLOCKED.to_uppercase()),
            RemoteError::Message("invalid passphrase for master public key".into()),
            RemoteError::status(Code::Unknown, rpc::UNKNOWN_UNLOCKER_DESC),
            RemoteError::status(Code::Unimplemented, "unknown service lnrpc.Lightning"),
        ];
        for err in cases {
            let outcome = classify_unlock(Err(err.clone()));
            assert!(matches!(outcome, Outcome::Failed(ref r) if r.contains(&err.to_string())), "{err}");
        }
    }

    #[test]
    fn test_init_failure_is_verbatim() {
        let err = RemoteError::status(Code::Unknown, "wallet already exists");
        let outcome = classify_init(Err(err));
        assert_eq!(
            outcome,
            Outcome::Failed("cannot create wallet: rpc error: code = Unknown desc = wallet already exists".into())
        );
        assert_eq!(classify_init(Ok(())), Outcome::Created);
    }

    #[test]
    fn test_outcome_json_shape() {
        assert_eq!(serde_json::to_value(Outcome::AlreadyUnlocked).unwrap(), serde_json::json!({"outcome": "already_unlocked"}));
        assert_eq!(
            serde_json::to_value(Outcome::Failed("boom".into())).unwrap(),
            serde_json::json!({"outcome": "failed", "reason": "boom"})
        );
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(Outcome::Created.to_string(), status::CREATED);
        assert_eq!(Outcome::AlreadyUnlocked.to_string(), status::ALREADY_UNLOCKED);
        assert!(Outcome::AlreadyUnlocked.is_success());
        assert!(!Outcome::Failed(String::new()).is_success());
    }
}
