//! Error types for connection string parsing.

use thiserror::Error;

/// Result type for connection string parsing.
pub type AeroUrlResult<T> = Result<T, AeroUrlError>;

/// Errors that can occur while turning a connection string into a client factory.
///
/// Errors raised by the database client while building a connection are not
/// represented here; [`AerospikeClientFactory::build`](crate::AerospikeClientFactory::build)
/// hands them back unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AeroUrlError {
    /// The connection string was empty or only whitespace.
    #[error("empty aerospike connection string")]
    EmptyConnectionString,

    /// The connection string is not a syntactically valid URL.
    #[error("invalid connection URL: {0}")]
    Url(#[from] url::ParseError),

    /// The URL scheme is not `aerospike`.
    #[error("invalid url scheme '{scheme}', want: aerospike://")]
    InvalidScheme {
        /// The scheme found in the URL, empty when none was present.
        scheme: String,
    },

    /// The URL has no hostname.
    #[error("aerospike hostname cannot be empty")]
    EmptyHostname,

    /// The URL has no port.
    #[error("aerospike port cannot be empty")]
    EmptyPort,

    /// The URL port is not a number in `0..=65535`.
    #[error("aerospike port '{port}' must be within 0 to 65535")]
    InvalidPort {
        /// The raw port text, when it could be recovered from the input.
        port: String,
    },

    /// The first path segment is missing or blank.
    #[error("aerospike namespace cannot be empty")]
    EmptyNamespace,

    /// The namespace contains whitespace.
    #[error("aerospike namespace '{namespace}' is invalid")]
    InvalidNamespace {
        /// The decoded namespace segment.
        namespace: String,
    },

    /// The environment variable holding the connection string is not set.
    #[error("environment variable not found: {0}")]
    EnvNotFound(String),
}

impl AeroUrlError {
    /// Create an invalid scheme error.
    pub fn invalid_scheme(scheme: impl Into<String>) -> Self {
        Self::InvalidScheme {
            scheme: scheme.into(),
        }
    }

    /// Create an invalid port error.
    pub fn invalid_port(port: impl Into<String>) -> Self {
        Self::InvalidPort { port: port.into() }
    }

    /// Create an invalid namespace error.
    pub fn invalid_namespace(namespace: impl Into<String>) -> Self {
        Self::InvalidNamespace {
            namespace: namespace.into(),
        }
    }

    /// Check if the error came from the generic URL syntax parser.
    #[must_use]
    pub fn is_url_syntax(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    /// Check if the error is one of the structural aerospike URL checks.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidScheme { .. }
                | Self::EmptyHostname
                | Self::EmptyPort
                | Self::InvalidPort { .. }
                | Self::EmptyNamespace
                | Self::InvalidNamespace { .. }
        )
    }
}
