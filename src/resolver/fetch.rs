//! Reading built-in assets and downloading remote models to the asset folder.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::Duration;

use bevy_furniture::Bounds;

use super::chain::{AssetSource, BoxFuture, LoadedAsset};
use super::glb::{model_bounds, GlbError};
use crate::catalog::LocalAsset;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("asset read failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("download failed: {0}")]
    Request(String),
    #[error("download returned status {0}")]
    Status(u16),
    #[error(transparent)]
    Model(#[from] GlbError),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Asset source backed by the Bevy asset folder on disk
pub struct FileAssetSource {
    root: PathBuf,
    download_dir: String,
    http: reqwest::Client,
}

impl FileAssetSource {
    pub fn new(root: PathBuf, download_dir: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| FetchError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            root,
            download_dir: download_dir.into(),
            http,
        })
    }

    async fn read_bounds(&self, relative: &str) -> Result<Bounds, FetchError> {
        let path = self.root.join(relative);
        let bytes = tokio::fs::read(&path).await.map_err(|source| FetchError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(model_bounds(&bytes)?)
    }

    async fn fetch_remote(&self, keyword: &str, url: &str) -> Result<LoadedAsset, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status(status));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        // Validate before anything touches the disk
        let bounds = model_bounds(&bytes)?;

        let relative = format!("{}/{}", self.download_dir, download_file_name(keyword, url));
        let path = self.root.join(&relative);
        let io_error = |source| FetchError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(io_error)?;
        }
        tokio::fs::write(&path, &bytes).await.map_err(io_error)?;

        Ok(LoadedAsset {
            path: relative,
            bounds,
        })
    }
}

impl AssetSource for FileAssetSource {
    fn load_local<'a>(&'a self, asset: &'a LocalAsset) -> BoxFuture<'a, Result<LoadedAsset, FetchError>> {
        Box::pin(async move {
            let bounds = self.read_bounds(asset.path).await?;
            Ok(LoadedAsset {
                path: asset.path.to_string(),
                bounds,
            })
        })
    }

    fn download<'a>(&'a self, keyword: &'a str, url: &'a str) -> BoxFuture<'a, Result<LoadedAsset, FetchError>> {
        Box::pin(self.fetch_remote(keyword, url))
    }
}

/// Stable file name for a downloaded model: the keyword slug plus a hash of its URL
pub fn download_file_name(keyword: &str, url: &str) -> String {
    let slug: String = keyword
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let mut hasher = DefaultHasher::new();
    url.hash(&mut hasher);
    format!("{slug}-{:016x}.glb", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::glb::pack_glb;

    const BOX_JSON: &str = r#"{
        "nodes": [{"mesh": 0}],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
        "accessors": [{"min": [0, 0, 0], "max": [2, 1, 1]}]
    }"#;

    #[test]
    fn file_names_are_stable_and_safe() {
        let a = download_file_name("coffee table", "https://x.test/1.glb");
        let b = download_file_name("coffee table", "https://x.test/1.glb");
        let c = download_file_name("coffee table", "https://x.test/2.glb");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("coffee_table-"));
        assert!(a.ends_with(".glb"));
    }

    #[tokio::test]
    async fn reads_local_asset_bounds() {
        let root = std::env::temp_dir().join(format!("scene_builder_fetch_{}", std::process::id()));
        std::fs::create_dir_all(root.join("furniture")).expect("temp dir");
        std::fs::write(root.join("furniture/box.glb"), pack_glb(BOX_JSON)).expect("write");

        let source = FileAssetSource::new(root.clone(), "downloads", Duration::from_secs(1)).expect("client");
        let asset = LocalAsset {
            keyword: "box",
            path: "furniture/box.glb",
            scale: 1.0,
        };
        let loaded = source.load_local(&asset).await.expect("readable");
        assert_eq!(loaded.path, "furniture/box.glb");
        assert_eq!(loaded.bounds.size(), bevy::math::Vec3::new(2.0, 1.0, 1.0));

        let missing = LocalAsset {
            path: "furniture/missing.glb",
            ..asset
        };
        assert!(matches!(source.load_local(&missing).await, Err(FetchError::Io { .. })));

        let _ = std::fs::remove_dir_all(root);
    }
}
