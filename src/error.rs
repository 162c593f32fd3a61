//! Application error types using thiserror
//!
//! Error hierarchy:
//! - TemplateError: A descriptor lacks data an endpoint template needs
//! - TransportError: The HTTP collaborator failed (carried as an error sentinel)
//! - ConfigError: Issues with configuration and option storage
//! - CheckError: Issues with the update-check cycle

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Endpoint resolution errors
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// HTTP collaborator errors
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Update-check related errors
    #[error(transparent)]
    Check(#[from] CheckError),
}

/// Errors raised while resolving an endpoint template.
///
/// These are contract violations by the caller (a descriptor without the
/// data an endpoint needs), never runtime or network conditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder required by the endpoint has no value
    #[error("missing '{field}' required by the {endpoint} endpoint")]
    MissingField {
        field: &'static str,
        endpoint: &'static str,
    },

    /// The forge base URI cannot be turned into an API root
    #[error("invalid forge base URI '{uri}': {message}")]
    InvalidBaseUri { uri: String, message: String },
}

/// Failures reported by the HTTP collaborator.
///
/// The adapter never interprets these; they travel unchanged inside
/// [`RawResponse::Failure`](crate::domain::RawResponse::Failure).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Resource not found
    #[error("not found: {url}")]
    NotFound {
        url: String,
        payload: Option<serde_json::Value>,
    },

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Status {
        url: String,
        status: u16,
        payload: Option<serde_json::Value>,
    },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {url}")]
    RateLimitExceeded { url: String },

    /// Timeout
    #[error("timeout while fetching {url}")]
    Timeout { url: String },

    /// Network request failed
    #[error("failed to fetch {url}: {message}")]
    Network { url: String, message: String },

    /// Body could not be read
    #[error("invalid response body from {url}: {message}")]
    InvalidBody { url: String, message: String },
}

/// Errors related to configuration and option storage
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration or option file
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an option file
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse TOML in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Failed to create the HTTP client
    #[error("failed to create HTTP client: {message}")]
    HttpClient { message: String },

    /// A required argument was not supplied
    #[error("missing required argument: {name}")]
    MissingArgument { name: &'static str },
}

/// Errors raised by the update-check cycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// The host registry has no descriptor for this slug
    #[error("repository '{slug}' is not tracked")]
    NotTracked { slug: String },

    /// No adapter is registered for the descriptor's forge
    #[error("no adapter registered for forge '{forge}'")]
    NoAdapter { forge: String },
}

impl TemplateError {
    /// Creates a new MissingField error
    pub fn missing_field(field: &'static str, endpoint: &'static str) -> Self {
        TemplateError::MissingField { field, endpoint }
    }

    /// Creates a new InvalidBaseUri error
    pub fn invalid_base_uri(uri: impl Into<String>, message: impl Into<String>) -> Self {
        TemplateError::InvalidBaseUri {
            uri: uri.into(),
            message: message.into(),
        }
    }
}

impl TransportError {
    /// Creates a new Network error
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        TransportError::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(url: impl Into<String>) -> Self {
        TransportError::Timeout { url: url.into() }
    }

    /// Creates a new RateLimitExceeded error
    pub fn rate_limit_exceeded(url: impl Into<String>) -> Self {
        TransportError::RateLimitExceeded { url: url.into() }
    }

    /// Returns the forge-native error payload, if the forge sent one
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            TransportError::NotFound { payload, .. } | TransportError::Status { payload, .. } => {
                payload.as_ref()
            }
            _ => None,
        }
    }
}

impl ConfigError {
    /// Creates a new Read error
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Write error
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a new Parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
