use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::SceneSnapshot;

#[derive(Debug, Error)]
pub enum StoreError {
    /// No platform data directory to save under
    #[error("no data directory available")]
    NoDataDir,
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode scene: {0}")]
    Encode(#[from] ron::Error),
    #[error("failed to decode scene: {0}")]
    Decode(#[from] ron::error::SpannedError),
}

/// Durable storage for scene snapshots
pub trait SceneStore: Send + Sync + 'static {
    fn save(&self, snapshot: &SceneSnapshot) -> Result<(), StoreError>;

    /// `Ok(None)` when nothing has been saved for the project yet
    fn load(&self, project_id: &str) -> Result<Option<SceneSnapshot>, StoreError>;
}

/// One pretty-printed RON file per project
#[derive(Debug, Clone)]
pub struct RonFileStore {
    root: PathBuf,
}

impl RonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `{data_dir}/bevy_scene_builder/scenes`
    pub fn in_data_dir() -> Result<Self, StoreError> {
        let data = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        Ok(Self::new(data.join("bevy_scene_builder").join("scenes")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, project_id: &str) -> PathBuf {
        let name: String = project_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let name = if name.is_empty() { "default".to_string() } else { name };
        self.root.join(format!("{name}.ron"))
    }
}

impl SceneStore for RonFileStore {
    fn save(&self, snapshot: &SceneSnapshot) -> Result<(), StoreError> {
        let path = self.path_for(&snapshot.project_id);
        let content = ron::ser::to_string_pretty(snapshot, ron::ser::PrettyConfig::default())?;

        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        // Atomic replace; each write stages under its own name
        let staging = path.with_extension(format!("ron.{:016x}.tmp", fastrand::u64(..)));
        fs::write(&staging, content).map_err(|source| StoreError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &path).map_err(|source| StoreError::Io { path, source })
    }

    fn load(&self, project_id: &str) -> Result<Option<SceneSnapshot>, StoreError> {
        let path = self.path_for(project_id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Some(ron::from_str(&content)?))
    }
}
