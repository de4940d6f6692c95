//! Model loading.
//!
//! [`LocalModelLoader`] resolves a model identifier to a directory under a
//! models root and builds the matching in-process backend.
//!
//! # Available Backends
//!
//! Enable backends via Cargo features:
//! - `kokoro` - Kokoro TTS (ONNX format, espeak-ng required)
//!
//! # Models Directory Layout
//!
//! A model id `org/Name` is looked up as `{root}/org/Name`, then `{root}/Name`:
//!
//! ```text
//! models/
//! └── Kokoro-82M-bf16/
//!     ├── kokoro-v1.0.onnx
//!     ├── voices-v1.0.bin
//!     └── config.json
//! ```

#[cfg(feature = "kokoro")]
pub mod kokoro;

use std::path::{Path, PathBuf};

use crate::error::{Result, TtsError};
use crate::{ModelLoader, SpeechModel};

/// Default models root when none is configured.
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Which in-process implementation serves a model id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Kokoro,
}

impl BackendKind {
    /// Backend for `model_id`, judged from its name.
    pub fn for_model(model_id: &str) -> Option<Self> {
        if model_id.to_lowercase().contains("kokoro") {
            Some(BackendKind::Kokoro)
        } else {
            None
        }
    }
}

/// Parameters for configuring model loading.
#[derive(Debug, Clone, Default)]
pub struct ModelParams {
    /// Number of CPU threads to use for inference.
    /// `None` uses the runtime default (typically all available cores).
    pub num_threads: Option<usize>,
}

/// Loads models from a local models directory.
#[derive(Debug, Clone)]
pub struct LocalModelLoader {
    models_dir: PathBuf,
    params: ModelParams,
}

impl Default for LocalModelLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MODELS_DIR)
    }
}

impl LocalModelLoader {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            params: ModelParams::default(),
        }
    }

    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Directory holding `model_id`, if one exists.
    pub fn model_dir(&self, model_id: &str) -> Result<PathBuf> {
        let full = self.models_dir.join(model_id);
        if full.is_dir() {
            return Ok(full);
        }

        let short_name = model_id.rsplit('/').next().unwrap_or(model_id);
        let short = self.models_dir.join(short_name);
        if short.is_dir() {
            return Ok(short);
        }

        Err(TtsError::ModelNotFound {
            model_id: model_id.to_string(),
            path: short,
        })
    }
}

impl ModelLoader for LocalModelLoader {
    fn load_model(&self, model_id: &str) -> Result<Box<dyn SpeechModel>> {
        let backend = BackendKind::for_model(model_id).ok_or_else(|| TtsError::Unsupported {
            model_id: model_id.to_string(),
            capability: "local inference",
        })?;
        let dir = self.model_dir(model_id)?;
        log::info!("Loading model: {} from {}", model_id, dir.display());

        match backend {
            #[cfg(feature = "kokoro")]
            BackendKind::Kokoro => {
                let model = kokoro::KokoroModel::load(model_id, &dir, self.params.num_threads)?;
                Ok(Box::new(model))
            }
            #[cfg(not(feature = "kokoro"))]
            BackendKind::Kokoro => Err(TtsError::Unsupported {
                model_id: model_id.to_string(),
                capability: "Kokoro inference (build with `--features kokoro`)",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn picks_backend_from_model_name() {
        assert_eq!(
            BackendKind::for_model("mlx-community/Kokoro-82M-bf16"),
            Some(BackendKind::Kokoro)
        );
        assert_eq!(
            BackendKind::for_model("mlx-community/Qwen3-TTS-12Hz-0.6B-Base-bf16"),
            None
        );
    }

    #[test]
    fn finds_model_by_full_id_then_short_name() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("Kokoro-82M-bf16")).unwrap();
        let loader = LocalModelLoader::new(root.path());
        assert_eq!(
            loader.model_dir("mlx-community/Kokoro-82M-bf16").unwrap(),
            root.path().join("Kokoro-82M-bf16")
        );

        fs::create_dir_all(root.path().join("mlx-community/Kokoro-82M-bf16")).unwrap();
        assert_eq!(
            loader.model_dir("mlx-community/Kokoro-82M-bf16").unwrap(),
            root.path().join("mlx-community/Kokoro-82M-bf16")
        );
    }

    #[test]
    fn missing_model_dir_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let loader = LocalModelLoader::new(root.path());
        let err = loader.load_model("mlx-community/Kokoro-82M-bf16").err().unwrap();
        assert!(matches!(
            err,
            TtsError::ModelNotFound { path, .. } if path == root.path().join("Kokoro-82M-bf16")
        ));
    }

    #[test]
    fn thread_count_is_kept_for_backends() {
        let loader = LocalModelLoader::new("models");
        assert_eq!(loader.params().num_threads, None);

        let loader = loader.with_params(ModelParams {
            num_threads: Some(4),
        });
        assert_eq!(loader.params().num_threads, Some(4));
        assert_eq!(loader.models_dir(), Path::new("models"));
    }

    #[test]
    fn models_without_backend_are_unsupported() {
        let loader = LocalModelLoader::new("models");
        let err = loader
            .load_model("mlx-community/Qwen3-TTS-12Hz-1.7B-CustomVoice-bf16")
            .err()
            .unwrap();
        assert!(matches!(err, TtsError::Unsupported { capability: "local inference", .. }));
    }
}
