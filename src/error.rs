use serde::{ser::Serializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A specialized `Result` type for the bridge client crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the bridge client crate.
///
/// The first six variants are reported by (or about) the bridge itself;
/// the rest are raised locally before or around the HTTP exchange.
#[derive(Debug, Error)]
pub enum Error {
    /// The bridge answered a call with `wamp.error.no_such_procedure`.
    #[error("No callee registered: {0:?}")]
    NoCalleeRegistered(Option<Value>),

    /// The bridge answered a call with any other error.
    #[error("Call runtime error: {0:?}")]
    CallRuntimeError(Option<Value>),

    /// Any status other than 200, 400 or 401.
    #[error("Bad URL: {0}")]
    BadUrl(String),

    /// DNS, connect, timeout or other transport failure.
    #[error("Bad host: {0}")]
    BadHost(String),

    /// Status 400.
    #[error("Missing params: {0}")]
    MissingParams(String),

    /// Status 401.
    #[error("Signature error: {0}")]
    SignatureError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Worker error: {0}")]
    Worker(String),
}

impl Error {
    /// Returns true for conditions produced by a completed exchange with
    /// the bridge (or the failure to reach it).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::NoCalleeRegistered(_)
                | Error::CallRuntimeError(_)
                | Error::BadUrl(_)
                | Error::BadHost(_)
                | Error::MissingParams(_)
                | Error::SignatureError(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::BadHost(err.to_string())
    }
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
