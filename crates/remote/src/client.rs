//! HTTP client for the indexing service
//!
//! Every endpoint is a JSON `POST` under `{base}/cli/`. The token travels
//! in the body, as the service expects, and as a bearer header.

use crate::error::{RemoteError, Result};
use driftsync_core::{ContextId, FileRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A workspace on the indexing service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    #[serde(rename = "spaceId")]
    pub id: String,
    #[serde(rename = "spaceName")]
    pub name: String,
}

/// A repository already indexed in a space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(rename = "contextId")]
    pub context_id: ContextId,
    #[serde(rename = "contextName")]
    pub name: String,
}

/// Body of a `/cli/chunk` upload
#[derive(Debug, Serialize)]
pub struct ChunkRequest<'a> {
    pub files: &'a [FileRecord],
    pub token: &'a str,
    #[serde(rename = "contextId", skip_serializing_if = "Option::is_none")]
    pub context_id: Option<&'a str>,
    #[serde(rename = "contextName")]
    pub context_name: &'a str,
    #[serde(rename = "spaceId", skip_serializing_if = "Option::is_none")]
    pub space_id: Option<&'a str>,
    /// False for the initial full upload, true afterwards
    pub update: bool,
}

#[derive(Serialize)]
struct TokenBody<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct SpaceBody<'a> {
    token: &'a str,
    #[serde(rename = "spaceId")]
    space_id: &'a str,
}

#[derive(Deserialize)]
struct ChunkResponse {
    #[serde(rename = "contextId", default)]
    context_id: ContextId,
}

#[derive(Debug, Clone)]
pub struct RemoteClient {
    base_url: String,
    http: reqwest::Client,
}

impl RemoteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Spaces the token has access to
    pub async fn list_spaces(&self, token: &str) -> Result<Vec<Space>> {
        self.post("/cli/spaces", token, &TokenBody { token }).await
    }

    /// Repositories already indexed in `space_id`
    pub async fn list_repositories(&self, token: &str, space_id: &str) -> Result<Vec<Repository>> {
        self.post(
            "/cli/space-repositories",
            token,
            &SpaceBody { token, space_id },
        )
        .await
    }

    /// Upload a batch of files, returning the context id the service assigned
    ///
    /// An empty id in the response is passed through; callers decide
    /// whether to keep a previous one.
    pub async fn upload_chunk(&self, request: &ChunkRequest<'_>) -> Result<ContextId> {
        let response: ChunkResponse = self.post("/cli/chunk", request.token, request).await?;
        Ok(response.context_id)
    }

    async fn post<B, T>(&self, endpoint: &str, token: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{endpoint}", self.base_url);
        debug!(url = %url, "sending request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status != reqwest::StatusCode::OK {
            return Err(RemoteError::Status {
                endpoint: endpoint.to_string(),
                status,
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| RemoteError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}
