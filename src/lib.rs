//! # tts-record
//!
//! Convert text files to speech by dispatching to one of several
//! interchangeable text-to-speech engines, with optional voice cloning from a
//! reference recording.
//!
//! ## Features
//!
//! - **Three engines**: direct synthesis (`kokoro`), reference-cloned synthesis
//!   (`qwen3-clone`) and predefined-speaker synthesis (`qwen3-custom`)
//! - **Voice aliases**: well-known voice names map to bundled reference audio
//!   and transcripts for cloning
//! - **Deterministic output paths**: `{input_dir}/{date}-{stem}-{model}.wav`
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! tts-record = { version = "2026.2", features = ["kokoro"] }
//! ```
//!
//! ```ignore
//! use std::path::PathBuf;
//! use tts_record::{
//!     backends::LocalModelLoader, engine::EngineTable, pipeline::{synthesize_file, SynthesisOptions},
//!     voices::VoiceAliasRegistry,
//! };
//!
//! let loader = LocalModelLoader::new("models");
//! let options = SynthesisOptions::new(PathBuf::from("notes.txt"));
//! let report = synthesize_file(
//!     &options,
//!     &EngineTable::default(),
//!     &VoiceAliasRegistry::builtin("."),
//!     &loader,
//! )?;
//! println!("Wrote {}", report.output_path.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod audio;
pub mod backends;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod reference;
pub mod voices;

use std::path::Path;

pub use audio::AudioChunk;
pub use error::{Result, TtsError};

/// Parameters for a model's direct generation capability.
///
/// Direct synthesis fills `voice` and `speed`; reference-cloned synthesis
/// fills `ref_audio`, `ref_text`, `language` and `instruct`. Fields a mode
/// does not use stay `None`.
#[derive(Debug, Clone, Default)]
pub struct GenerateParams<'a> {
    pub text: &'a str,
    pub voice: Option<&'a str>,
    pub speed: Option<f32>,
    pub ref_audio: Option<&'a Path>,
    pub ref_text: Option<&'a str>,
    pub language: Option<&'a str>,
    pub instruct: Option<&'a str>,
}

/// Parameters for a model's predefined-speaker generation capability.
#[derive(Debug, Clone)]
pub struct CustomVoiceParams<'a> {
    pub text: &'a str,
    pub speaker: &'a str,
    pub language: &'a str,
    pub instruct: &'a str,
}

/// A loaded text-to-speech model.
///
/// Every call returns the complete, ordered chunk sequence for the request.
pub trait SpeechModel {
    /// Identifier the model was loaded under.
    fn model_id(&self) -> &str;

    /// Synthesize speech, either directly from a voice or cloned from reference material.
    fn generate(&mut self, params: &GenerateParams<'_>) -> Result<Vec<AudioChunk>>;

    /// Synthesize speech with a predefined speaker and a style instruction.
    ///
    /// Models without predefined speakers keep the default implementation.
    fn generate_custom_voice(&mut self, _params: &CustomVoiceParams<'_>) -> Result<Vec<AudioChunk>> {
        Err(TtsError::Unsupported {
            model_id: self.model_id().to_string(),
            capability: "custom voice generation",
        })
    }
}

/// Factory turning a model identifier into a loaded [`SpeechModel`].
pub trait ModelLoader {
    fn load_model(&self, model_id: &str) -> Result<Box<dyn SpeechModel>>;
}
