//! Error types for the tool agent SDK

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SDK
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request error (connection refused, DNS, TLS, body decoding)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No credential was available when a request was attempted
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Non-success response from the provider, carrying the raw body
    #[error("API request failed ({status}): {body}")]
    Api { status: u16, body: String },

    /// A tool's own logic failed
    #[error("Tool execution error: {0}")]
    Tool(String),

    /// A tool invocation did not supply a parameter that has no default
    #[error("Required parameter '{0}' is missing")]
    MissingParameter(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout error
    #[error("Request timeout")]
    Timeout,

    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Create a new config error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Error::Auth(msg.into())
    }

    /// Create a new API error from a status code and raw response body
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Error::Api {
            status,
            body: body.into(),
        }
    }

    /// Create a new tool error
    pub fn tool(msg: impl Into<String>) -> Self {
        Error::Tool(msg.into())
    }

    /// Create a missing parameter error
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Error::MissingParameter(name.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a new other error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Create a timeout error
    pub fn timeout() -> Self {
        Error::Timeout
    }

    /// The failure message reported back to the model in a tool result.
    ///
    /// Tool failures carry the tool's own message without the `Display`
    /// prefix, so a tool returning `Error::tool("File not found: a.txt")`
    /// produces the result content `"Error: File not found: a.txt"`.
    pub fn tool_message(&self) -> String {
        match self {
            Error::Tool(msg) | Error::InvalidInput(msg) | Error::Other(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Tool(err.to_string())
    }
}
