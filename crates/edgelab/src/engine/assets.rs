//! Static asset sources.
//!
//! The engine only decides directives for assets; where the bytes come from
//! is behind [`AssetSource`].

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

pub const GALLERY_FILE: &str = "gallery.html";
pub const ASSETS_DIR: &str = "assets";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub body: Bytes,
    pub content_type: String,
}

impl Asset {
    pub fn new(path: &str, body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type_for(path),
        }
    }
}

pub fn content_type_for(path: &str) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() == mime_guess::mime::TEXT && mime.get_param("charset").is_none() {
        format!("{mime}; charset=utf-8")
    } else {
        mime.to_string()
    }
}

/// Loads asset bytes by relative path (e.g. `gallery.html`, `assets/app.css`).
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn load(&self, path: &str) -> Option<Asset>;
}

/// Reads assets from a directory on disk.
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for DirAssetSource {
    async fn load(&self, path: &str) -> Option<Asset> {
        let full = self.root.join(path);
        match tokio::fs::read(&full).await {
            Ok(bytes) => Some(Asset::new(path, bytes)),
            Err(err) => {
                debug!("Asset {} unavailable: {}", full.display(), err);
                None
            }
        }
    }
}

/// Fixed in-memory asset set.
#[derive(Default)]
pub struct MemoryAssetSource {
    files: HashMap<String, Bytes>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.files.insert(path.into(), body.into());
        self
    }
}

#[async_trait]
impl AssetSource for MemoryAssetSource {
    async fn load(&self, path: &str) -> Option<Asset> {
        self.files
            .get(path)
            .map(|body| Asset::new(path, body.clone()))
    }
}
