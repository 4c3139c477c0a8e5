//! Asynchronous model loading.
//!
//! Loading is the one suspension point in a session's life. Everything the
//! controller needs from a model is the set of animation clip names, which
//! the session turns into an [`crate::animation::AnimationCatalog`].

use std::future::Future;
use std::path::PathBuf;

use hashbrown::HashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a loader hands back for one model file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadedModel {
    /// Mesh names, in file order.
    pub meshes: Vec<String>,
    /// Animation clip names, in file order.
    pub animations: Vec<String>,
}

/// Why a model could not be loaded.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    /// Nothing is stored under the requested path.
    #[error("model `{0}` not found")]
    NotFound(String),
    /// The file exists but could not be read.
    #[error("failed to read model `{path}`")]
    Io {
        /// Requested path, relative to the loader.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid model manifest.
    #[error("model `{path}` is malformed")]
    Malformed {
        /// Requested path, relative to the loader.
        path: String,
        /// Parser failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Source of model files.
pub trait AssetLoader {
    /// Loads the model stored under `path`.
    fn load_model(&self, path: &str)
        -> impl Future<Output = Result<LoadedModel, AssetLoadError>>;
}

/// Loader serving models registered in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    models: HashMap<String, LoadedModel>,
}

impl MemoryLoader {
    /// An empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `model` under `path`, replacing any previous entry.
    #[must_use]
    pub fn with_model(mut self, path: impl Into<String>, model: LoadedModel) -> Self {
        self.models.insert(path.into(), model);
        self
    }
}

impl AssetLoader for MemoryLoader {
    fn load_model(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<LoadedModel, AssetLoadError>> {
        let result = self
            .models
            .get(path)
            .cloned()
            .ok_or_else(|| AssetLoadError::NotFound(path.to_owned()));
        std::future::ready(result)
    }
}

/// Loader reading JSON model manifests relative to a root directory.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    root: PathBuf,
}

impl ManifestLoader {
    /// Resolves model paths against `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetLoader for ManifestLoader {
    fn load_model(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<LoadedModel, AssetLoadError>> {
        let full = self.root.join(path);
        let path = path.to_owned();
        async move {
            debug!("reading manifest {}", full.display());
            let text = tokio::fs::read_to_string(&full).await.map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    AssetLoadError::NotFound(path.clone())
                } else {
                    AssetLoadError::Io {
                        path: path.clone(),
                        source,
                    }
                }
            })?;
            let model: LoadedModel = serde_json::from_str(&text)
                .map_err(|source| AssetLoadError::Malformed { path: path.clone(), source })?;
            info!(
                "loaded model {path} ({} meshes, {} clips)",
                model.meshes.len(),
                model.animations.len()
            );
            Ok(model)
        }
    }
}
