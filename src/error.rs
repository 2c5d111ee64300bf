// Gestion des erreurs personnalisées

use std::fmt;
use std::error::Error as StdError;

#[derive(Debug)]
pub enum AppError {
    /// Bad environment, unparseable neighbor table, malformed IP. Fatal at startup.
    ConfigError(String),
    /// UDP port unavailable. Fatal at startup.
    BindError(String),
    /// Malformed incoming LSA or hello message. Logged and dropped.
    ParseError(String),
    /// Transient UDP send failure. Logged, retried on the next cycle.
    SendError(String),
    /// Kernel rejected a route update. Logged, does not abort the batch.
    RouteInstallError(String),
    /// Malformed router identifier or non-/24 address.
    BadAddress(String),
    IOError(std::io::Error),
    SerializationError(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "configuration error: {msg}"),
            AppError::BindError(msg) => write!(f, "bind error: {msg}"),
            AppError::ParseError(msg) => write!(f, "parse error: {msg}"),
            AppError::SendError(msg) => write!(f, "send error: {msg}"),
            AppError::RouteInstallError(msg) => write!(f, "route install error: {msg}"),
            AppError::BadAddress(msg) => write!(f, "bad address: {msg}"),
            AppError::IOError(err) => write!(f, "IO error: {err}"),
            AppError::SerializationError(err) => write!(f, "serialization error: {err}"),
        }
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            AppError::IOError(err) => Some(err),
            AppError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IOError(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
