//! Error types for terminallynx.
//!
//! Every failure a chat exchange can hit is represented here, from missing
//! configuration at startup to transport failures, HTTP error statuses and
//! local file I/O.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::types::Model;

/// The main error type for terminallynx.
#[derive(Clone, Debug)]
pub enum Error {
    /// Required configuration is missing or invalid.
    Configuration {
        /// Human-readable error message.
        message: String,
    },

    /// The server rejected the request with a non-retryable status.
    ClientError {
        /// HTTP status code.
        status_code: u16,
        /// Response body or error message from the API.
        message: String,
    },

    /// The server failed with a 5xx status.
    ServerError {
        /// HTTP status code.
        status_code: u16,
        /// Response body or error message from the API.
        message: String,
    },

    /// The request did not complete before the client timeout.
    Timeout {
        /// Human-readable error message.
        message: String,
        /// Duration of the timeout in seconds.
        duration: Option<f64>,
    },

    /// Connection error.
    Connection {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// HTTP client error that is neither a timeout nor a connection failure.
    HttpClient {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON serialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// A URL parsing or manipulation error.
    Url {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<url::ParseError>,
    },

    /// The requested model is not on the allow-list.
    UnsupportedModel {
        /// The identifier that was requested.
        requested: String,
    },
}

impl Error {
    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new client (4xx) error.
    pub fn client_error(status_code: u16, message: impl Into<String>) -> Self {
        Error::ClientError {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new server (5xx) error.
    pub fn server_error(status_code: u16, message: impl Into<String>) -> Self {
        Error::ServerError {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a new error from an HTTP status that is not a success.
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        if (500..600).contains(&status_code) {
            Error::server_error(status_code, message)
        } else {
            Error::client_error(status_code, message)
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new URL error.
    pub fn url(message: impl Into<String>, source: Option<url::ParseError>) -> Self {
        Error::Url {
            message: message.into(),
            source,
        }
    }

    /// Creates a new unsupported model error.
    pub fn unsupported_model(requested: impl Into<String>) -> Self {
        Error::UnsupportedModel {
            requested: requested.into(),
        }
    }

    /// Returns true if this error is a configuration error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration { .. })
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Returns true if this error is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns true if this error is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::ServerError { .. })
    }

    /// Returns true if this error is a client error.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::ClientError { .. })
    }

    /// Returns true if this error is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }

    /// Returns true if this error is an unsupported model error.
    pub fn is_unsupported_model(&self) -> bool {
        matches!(self, Error::UnsupportedModel { .. })
    }

    /// Returns true if another attempt may succeed.
    ///
    /// Only transport failures and 5xx statuses qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::Connection { .. } | Error::ServerError { .. }
        )
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::ClientError { status_code, .. } | Error::ServerError { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration { message } => {
                write!(f, "Configuration error: {message}")
            }
            Error::ClientError {
                status_code,
                message,
            } => {
                write!(f, "Error {status_code}: {message}")
            }
            Error::ServerError {
                status_code,
                message,
            } => {
                write!(f, "Error {status_code}: {message}")
            }
            Error::Timeout { message, duration } => {
                if let Some(duration) = duration {
                    write!(f, "Request timed out: {message} ({duration} seconds)")
                } else {
                    write!(f, "Request timed out: {message}")
                }
            }
            Error::Connection { message, .. } => {
                write!(f, "Request failed: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
            Error::Io { message, source } => {
                write!(f, "{message}: {source}")
            }
            Error::Url { message, .. } => {
                write!(f, "URL error: {message}")
            }
            Error::UnsupportedModel { requested } => {
                let supported = Model::ALL
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "Unsupported model '{requested}'. Available models: {supported}"
                )
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Connection { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::HttpClient { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            Error::Url { source, .. } => {
                source.as_ref().map(|e| e as &(dyn error::Error + 'static))
            }
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io("I/O error", err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::url(format!("URL parse error: {err}"), Some(err))
    }
}

/// A specialized Result type for terminallynx operations.
pub type Result<T> = std::result::Result<T, Error>;
