//! Kokoro-82M backend.
//!
//! Runs the Kokoro-82M ONNX model in process, with espeak-ng as the
//! phonemizer. Kokoro only supports direct synthesis: a named voice at a given
//! speed. Requests carrying reference audio, and custom-voice requests, are
//! reported as unsupported.
//!
//! # System Requirements
//!
//! **espeak-ng** must be installed on your system:
//! - **Linux**: `sudo apt-get install espeak-ng`
//! - **macOS**: `brew install espeak-ng`
//! - **Windows**: Download installer from <https://espeak-ng.org/download>
//!
//! # Model Directory Layout
//!
//! ```text
//! models/Kokoro-82M-bf16/
//! ├── kokoro-quant-convinteger.onnx   # preferred; any *.onnx is accepted
//! ├── voices-v1.0.bin                  # voice style archive (.npz format)
//! └── config.json                      # phoneme vocabulary
//! ```
//!
//! # Chunking
//!
//! Phoneme sequences longer than 510 tokens are split at the last
//! punctuation before the limit. Every window becomes one [`AudioChunk`], so
//! long inputs produce several chunks in reading order.

mod model;
mod phonemizer;
mod styles;
mod vocab;

pub use model::KokoroError;

use std::path::Path;

use crate::audio::AudioChunk;
use crate::error::{Result, TtsError};
use crate::{GenerateParams, SpeechModel};

use model::KokoroSession;

/// Voice used when a request names none.
pub const DEFAULT_VOICE: &str = "af_heart";

impl From<KokoroError> for TtsError {
    fn from(err: KokoroError) -> Self {
        TtsError::model(err)
    }
}

/// A loaded Kokoro model.
pub struct KokoroModel {
    model_id: String,
    session: KokoroSession,
}

impl KokoroModel {
    /// Load the model files from `model_dir`.
    pub fn load(model_id: &str, model_dir: &Path, num_threads: Option<usize>) -> Result<Self> {
        let session = KokoroSession::load(model_dir, num_threads)?;
        Ok(Self {
            model_id: model_id.to_string(),
            session,
        })
    }
}

impl SpeechModel for KokoroModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn generate(&mut self, params: &GenerateParams<'_>) -> Result<Vec<AudioChunk>> {
        if params.ref_audio.is_some() {
            return Err(TtsError::Unsupported {
                model_id: self.model_id.clone(),
                capability: "reference voice cloning",
            });
        }

        let voice = params.voice.unwrap_or(DEFAULT_VOICE);
        let speed = params.speed.unwrap_or(1.0);
        let windows = self.session.synthesize_windows(params.text, voice, speed)?;

        Ok(windows
            .into_iter()
            .filter(|samples| !samples.is_empty())
            .map(AudioChunk::new)
            .collect())
    }
}
