//! Error types for the indexing service client

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RemoteError>;

#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport failure (connect, TLS, timeout)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with anything other than 200
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// No token is stored and none was supplied through the environment
    #[error("not logged in (run `drift login --token <TOKEN>`)")]
    NotLinked,

    #[error("token file {path}: {source}")]
    Token {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no spaces are available for this account")]
    NoSpaces,

    #[error("space {0} is not available for this account")]
    UnknownSpace(String),

    /// More than one space and none was requested
    #[error("{0} spaces available, choose one with --space")]
    AmbiguousSpace(usize),
}
