use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a command line into a running process.
///
/// Every variant except [`ShellError::Read`] is recoverable: it is reported
/// as a diagnostic and the interactive loop keeps going.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("syntax error near unexpected token `{0}'")]
    Syntax(String),

    #[error("{}: {source}", path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("{name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("wait: {0}")]
    Wait(#[source] io::Error),

    #[error("read: {0}")]
    Read(String),
}

pub type ShellResult<T> = Result<T, ShellError>;

/// Errors produced by the `suggest` built-in.
#[derive(Error, Debug)]
pub enum SuggestError {
    #[error("expected argument")]
    MissingPrompt,

    #[error("{0} environment variable missing")]
    MissingCredential(&'static str),

    #[error("invalid endpoint: {0}")]
    Endpoint(String),

    #[error("API call failed: {0}")]
    Transport(#[from] HttpError),

    #[error("API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("error parsing JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected API response format")]
    UnexpectedFormat,
}

/// Errors from the minimal HTTP client.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("could not resolve {0}")]
    Resolve(String),

    #[error("connect: {0}")]
    Connect(#[source] io::Error),

    #[error("TLS: {0}")]
    Tls(String),

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("malformed HTTP response: {0}")]
    Malformed(&'static str),

    #[error("response body exceeds 8 MB limit")]
    TooLarge,
}
