//! Client side of the remote indexing service
//!
//! - `RemoteClient`: spaces, repositories and chunk uploads over HTTPS
//! - `Link`: which space and context a local repository uploads into
//! - `HttpUploadSink`: the `UploadSink` a watch session feeds
//! - `TokenStore`: the bearer token on disk

pub mod client;
pub mod error;
pub mod link;
pub mod sink;
pub mod token;

pub use client::{ChunkRequest, RemoteClient, Repository, Space};
pub use error::{RemoteError, Result};
pub use link::{choose_space, repo_name, Link};
pub use sink::HttpUploadSink;
pub use token::{TokenStore, TOKEN_ENV};
