//! Error types for Pokedex
//!
//! Uses `thiserror` for ergonomic error handling with full context preservation.
//! Every variant maps onto one of three client-facing categories, see [`ErrorKind`].

use std::fmt;
use thiserror::Error;

/// Result type alias for Pokedex operations
pub type Result<T> = std::result::Result<T, PokedexError>;

/// Primary error type for all Pokedex operations
#[derive(Error, Debug)]
pub enum PokedexError {
    /// Lookup term matched no record
    #[error("Pokemon with name, no or id \"{term}\" not found")]
    NotFound { term: String },

    /// Uniqueness violation on `no` or `name`
    #[error("Pokemon {key} already exists in the database")]
    DuplicateKey { key: String },

    /// Caller supplied something unusable
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Document store connection or query errors
    #[error("Store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Outbound HTTP errors (listing API)
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Payload serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Client-facing error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BadRequest,
    Internal,
}

impl ErrorKind {
    /// HTTP status code conventionally used for this category
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::BadRequest => 400,
            Self::Internal => 500,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl PokedexError {
    /// Create a not found error
    pub fn not_found(term: impl Into<String>) -> Self {
        Self::NotFound { term: term.into() }
    }

    /// Create a duplicate key error
    pub fn duplicate(key: impl Into<String>) -> Self {
        Self::DuplicateKey { key: key.into() }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error with source
    pub fn store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an HTTP error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
            source: None,
        }
    }

    /// Create an HTTP error with source
    pub fn http_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Http {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Client-facing category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateKey { .. } | Self::BadRequest { .. } => ErrorKind::BadRequest,
            _ => ErrorKind::Internal,
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Errors that carry a message meant for the caller; everything else is
    /// hidden behind a generic internal error at the service boundary.
    pub fn is_client_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }
}

impl From<serde_json::Error> for PokedexError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<config::ConfigError> for PokedexError {
    fn from(err: config::ConfigError) -> Self {
        Self::config(err.to_string())
    }
}
