//! Document fetchers.
//!
//! Both caches read JSON documents through the [`Fetcher`] trait so that
//! the network can be swapped for local files or a test double.

use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// Source of JSON documents addressed by URL or path.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch and parse the document at `url`.
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Fetches documents over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        tracing::debug!("GET {}", url);

        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }
}

/// Reads documents from a local directory.
///
/// A URL such as `/planner/agents-data.json` maps to
/// `<root>/planner/agents-data.json`.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        self.root.join(url.trim_start_matches('/'))
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let path = self.resolve(url);
        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?;
        serde_json::from_str(&body).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }
}

/// Serves documents from memory; unknown URLs answer with status 404.
///
/// Documents can be swapped while a cache holds the fetcher, which makes it
/// handy for revalidation tests and for embedding bundled assets.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    documents: RwLock<HashMap<String, Value>>,
    requests: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `document` for `url`, replacing any previous document.
    pub fn insert(&self, url: impl Into<String>, document: Value) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(url.into(), document);
        }
    }

    /// Stop serving `url`.
    pub fn remove(&self, url: &str) {
        if let Ok(mut documents) = self.documents.write() {
            documents.remove(url);
        }
    }

    /// Number of fetches answered so far, successful or not.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let document = self
            .documents
            .read()
            .ok()
            .and_then(|documents| documents.get(url).cloned());
        document.ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
