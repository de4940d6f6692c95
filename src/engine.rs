//! Engine selection and generation dispatch.
//!
//! Each engine maps to exactly one [`GenerationMode`]; the mode alone decides
//! which model capability runs and which request fields reach the model.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::audio::AudioChunk;
use crate::error::{Result, TtsError};
use crate::{CustomVoiceParams, GenerateParams, SpeechModel};

/// Selectable text-to-speech engines.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum EngineId {
    #[default]
    #[serde(rename = "kokoro")]
    #[value(name = "kokoro")]
    Kokoro,
    #[serde(rename = "qwen3-clone")]
    #[value(name = "qwen3-clone")]
    Qwen3Clone,
    #[serde(rename = "qwen3-custom")]
    #[value(name = "qwen3-custom")]
    Qwen3Custom,
}

/// How a model is asked to produce audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Synthesis from text, voice and speed.
    Direct,
    /// Synthesis mimicking a reference recording and its transcript.
    Cloning,
    /// Synthesis with a predefined speaker and a style instruction.
    CustomSpeaker,
}

impl EngineId {
    pub const ALL: [EngineId; 3] = [EngineId::Kokoro, EngineId::Qwen3Clone, EngineId::Qwen3Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            EngineId::Kokoro => "kokoro",
            EngineId::Qwen3Clone => "qwen3-clone",
            EngineId::Qwen3Custom => "qwen3-custom",
        }
    }

    pub fn mode(self) -> GenerationMode {
        match self {
            EngineId::Kokoro => GenerationMode::Direct,
            EngineId::Qwen3Clone => GenerationMode::Cloning,
            EngineId::Qwen3Custom => GenerationMode::CustomSpeaker,
        }
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineId {
    type Err = TtsError;

    fn from_str(s: &str) -> Result<Self> {
        EngineId::ALL
            .into_iter()
            .find(|engine| engine.as_str() == s)
            .ok_or_else(|| TtsError::UnknownEngine(s.to_string()))
    }
}

/// Model and default voice for one engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub engine_id: EngineId,
    pub model_id: String,
    pub default_voice: String,
}

impl EngineConfig {
    fn new(engine_id: EngineId, model_id: &str, default_voice: &str) -> Self {
        Self {
            engine_id,
            model_id: model_id.to_string(),
            default_voice: default_voice.to_string(),
        }
    }
}

/// Per-engine defaults, one entry for every [`EngineId`].
#[derive(Debug, Clone)]
pub struct EngineTable {
    kokoro: EngineConfig,
    qwen3_clone: EngineConfig,
    qwen3_custom: EngineConfig,
}

impl Default for EngineTable {
    fn default() -> Self {
        Self {
            kokoro: EngineConfig::new(EngineId::Kokoro, "mlx-community/Kokoro-82M-bf16", "af_heart"),
            // Clones the Kokoro-generated af_heart reference by default.
            qwen3_clone: EngineConfig::new(
                EngineId::Qwen3Clone,
                "mlx-community/Qwen3-TTS-12Hz-0.6B-Base-bf16",
                "af_heart",
            ),
            qwen3_custom: EngineConfig::new(
                EngineId::Qwen3Custom,
                "mlx-community/Qwen3-TTS-12Hz-1.7B-CustomVoice-bf16",
                "Vivian",
            ),
        }
    }
}

impl EngineTable {
    pub fn get(&self, engine_id: EngineId) -> &EngineConfig {
        match engine_id {
            EngineId::Kokoro => &self.kokoro,
            EngineId::Qwen3Clone => &self.qwen3_clone,
            EngineId::Qwen3Custom => &self.qwen3_custom,
        }
    }
}

/// Fully resolved parameters for one generation run.
///
/// Built once through [`GenerationRequestBuilder`], which rejects empty text,
/// non-positive speed, a zero sample rate and cloning requests lacking
/// reference material.
#[derive(Debug, Clone, Builder)]
#[builder(
    setter(into),
    build_fn(validate = "Self::validate", error = "TtsError")
)]
pub struct GenerationRequest {
    text: String,
    engine_id: EngineId,
    model_id: String,
    voice: String,
    #[builder(default = "1.0")]
    speed: f32,
    #[builder(default = "24000")]
    sample_rate: u32,
    #[builder(default = "String::from(\"English\")")]
    language: String,
    #[builder(default, setter(strip_option))]
    reference_audio_path: Option<PathBuf>,
    #[builder(default, setter(strip_option))]
    reference_text: Option<String>,
    #[builder(default, setter(strip_option))]
    instruct: Option<String>,
}

impl From<derive_builder::UninitializedFieldError> for TtsError {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        TtsError::InvalidRequest(format!("missing field `{}`", err.field_name()))
    }
}

impl GenerationRequestBuilder {
    fn validate(&self) -> Result<()> {
        if let Some(text) = &self.text {
            if text.trim().is_empty() {
                return Err(TtsError::InvalidRequest("text is empty".to_string()));
            }
        }
        if let Some(speed) = self.speed {
            if !(speed > 0.0 && speed.is_finite()) {
                return Err(TtsError::InvalidRequest(format!(
                    "speed must be positive, got {speed}"
                )));
            }
        }
        if self.sample_rate == Some(0) {
            return Err(TtsError::InvalidRequest(
                "sample rate must be positive".to_string(),
            ));
        }
        if self.engine_id.map(EngineId::mode) == Some(GenerationMode::Cloning) {
            let has_audio = matches!(&self.reference_audio_path, Some(Some(p)) if !p.as_os_str().is_empty());
            let has_text = matches!(&self.reference_text, Some(Some(t)) if !t.is_empty());
            if !has_audio || !has_text {
                return Err(TtsError::InvalidRequest(
                    "cloning requires reference audio and reference text".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl GenerationRequest {
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn engine_id(&self) -> EngineId {
        self.engine_id
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn reference_audio_path(&self) -> Option<&Path> {
        self.reference_audio_path.as_deref()
    }

    pub fn reference_text(&self) -> Option<&str> {
        self.reference_text.as_deref()
    }

    pub fn instruct(&self) -> Option<&str> {
        self.instruct.as_deref()
    }
}

/// Run the generation mode of `request.engine_id()` against `model`.
///
/// Model errors pass through untouched.
pub fn dispatch(model: &mut dyn SpeechModel, request: &GenerationRequest) -> Result<Vec<AudioChunk>> {
    let instruct = request.instruct().unwrap_or("");

    match request.engine_id().mode() {
        GenerationMode::Direct => {
            log::info!(
                "Generating speech with voice '{}' at speed {}...",
                request.voice(),
                request.speed()
            );
            model.generate(&GenerateParams {
                text: request.text(),
                voice: Some(request.voice()),
                speed: Some(request.speed()),
                ..Default::default()
            })
        }
        GenerationMode::Cloning => {
            log::info!(
                "Generating cloned speech (voice: {}, language: {})...",
                request.voice(),
                request.language()
            );
            if !instruct.is_empty() {
                log::info!("  Instruct: {instruct}");
            }
            model.generate(&GenerateParams {
                text: request.text(),
                ref_audio: request.reference_audio_path(),
                ref_text: request.reference_text(),
                language: Some(request.language()),
                instruct: Some(instruct),
                ..Default::default()
            })
        }
        GenerationMode::CustomSpeaker => {
            log::info!(
                "Generating speech with custom voice (speaker: {}, language: {})...",
                request.voice(),
                request.language()
            );
            if !instruct.is_empty() {
                log::info!("  Instruct: {instruct}");
            }
            model.generate_custom_voice(&CustomVoiceParams {
                text: request.text(),
                speaker: request.voice(),
                language: request.language(),
                instruct,
            })
        }
    }
}
