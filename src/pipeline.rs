//! End-to-end runs: synthesize a text file, or generate a cloning reference.
//!
//! Every step runs to completion before the next one starts, and the output
//! file is only created once a non-empty chunk sequence has been assembled.

use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::{assemble, duration_secs, write_audio};
use crate::engine::{dispatch, EngineId, EngineTable, GenerationMode, GenerationRequest};
use crate::error::{Result, TtsError};
use crate::output::resolve_output_path;
use crate::reference::ReferenceResolver;
use crate::voices::VoiceAliasRegistry;
use crate::ModelLoader;

/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Default language for the cloning and custom-speaker engines.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Phoneme-rich paragraph read aloud to produce a cloning reference.
///
/// Covers all 24 English consonants and 20 vowels/diphthongs, including the
/// rarer /ʒ/ (unusual, vision), /ɔɪ/ (enjoyed, voice), /ʊə/ (pure, sure) and
/// /eə/ (air, careful), without tongue twisters.
pub const PHONEME_TEXT: &str = "The rain arrived early on Tuesday, and the streets in the city were calm. \
I walked past a quiet cafe, a small bookshop, and a yellow bus waiting at the corner. \
At nine fifteen, a train left the station for London, and a second train followed at \
nine thirty. A friend from Mumbai called later to confirm the plan for Friday. \
We agreed to meet near the old bridge, just after six. I said hello to Ravi, Maria, \
and Jean, and we talked about travel, work, and music. I enjoyed the casual atmosphere, \
which felt unusual in a pleasant way. \
Today's weather report said temperatures would stay between twelve and twenty one \
degrees, with light wind from the west. The forecast for the weekend mentioned \
scattered showers, but no storms. I was fairly sure the air would stay pure and fresh. \
I packed a light jacket, a notebook, and a charger. \
On the way home, I stopped at a market and bought rice, fruit, and coffee. The cashier \
asked me to repeat my phone number, so I spoke slowly: five, five, five, two, four, \
zero, nine, three, one, eight. \
In the evening, I read a short article about history and science. The author's vision \
showed careful attention to each point. It explained how \
small changes can lead to large results, especially over time. The example was simple: \
plant a seed, water it daily, and it grows. I like that idea because it is practical \
and clear. Before I went to sleep, I set the alarm for six thirty, turned off the \
light, and felt grateful for a quiet day.";

/// Inputs for synthesizing one text file.
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    pub input_file: PathBuf,
    /// Explicit output path; derived from the input file when `None`.
    pub out: Option<PathBuf>,
    pub engine: EngineId,
    /// Voice or speaker name; the engine's default when `None`.
    pub voice: Option<String>,
    pub speed: f32,
    pub sample_rate: u32,
    pub language: String,
    pub ref_audio: Option<PathBuf>,
    /// Inline transcript or path to a transcript file.
    pub ref_text: Option<String>,
    pub instruct: Option<String>,
}

impl SynthesisOptions {
    pub fn new(input_file: impl Into<PathBuf>) -> Self {
        Self {
            input_file: input_file.into(),
            out: None,
            engine: EngineId::default(),
            voice: None,
            speed: 1.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            language: DEFAULT_LANGUAGE.to_string(),
            ref_audio: None,
            ref_text: None,
            instruct: None,
        }
    }
}

/// Inputs for generating a reference recording.
#[derive(Debug, Clone)]
pub struct ReferenceOptions {
    pub model: String,
    pub voice: String,
    pub speed: f32,
    pub sample_rate: u32,
    /// Text to speak; [`PHONEME_TEXT`] when `None`.
    pub text: Option<String>,
    pub out: PathBuf,
}

impl Default for ReferenceOptions {
    fn default() -> Self {
        let kokoro = EngineTable::default().get(EngineId::Kokoro).clone();
        Self {
            model: kokoro.model_id,
            voice: kokoro.default_voice,
            speed: 1.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            text: None,
            out: PathBuf::from("reference.wav"),
        }
    }
}

impl ReferenceOptions {
    pub fn text(&self) -> &str {
        self.text
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(PHONEME_TEXT)
    }
}

/// Summary of a written audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisReport {
    pub output_path: PathBuf,
    pub sample_rate: u32,
    pub samples: usize,
}

impl SynthesisReport {
    pub fn duration_secs(&self) -> f64 {
        duration_secs(self.samples, self.sample_rate)
    }
}

/// Read the input file, stripped of surrounding whitespace.
pub fn read_input_text(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)?.trim().to_string();
    if text.is_empty() {
        return Err(TtsError::EmptyInput(path.to_path_buf()));
    }
    Ok(text)
}

/// Synthesize `options.input_file` and write the WAV file.
pub fn synthesize_file(
    options: &SynthesisOptions,
    engines: &EngineTable,
    aliases: &VoiceAliasRegistry,
    loader: &dyn ModelLoader,
) -> Result<SynthesisReport> {
    let text = read_input_text(&options.input_file)?;

    let engine = engines.get(options.engine);
    let voice = options
        .voice
        .clone()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| engine.default_voice.clone());
    let output_path = options
        .out
        .clone()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| resolve_output_path(&options.input_file, &engine.model_id));

    let mut builder = GenerationRequest::builder();
    builder
        .text(text)
        .engine_id(engine.engine_id)
        .model_id(engine.model_id.clone())
        .voice(voice.clone())
        .speed(options.speed)
        .sample_rate(options.sample_rate)
        .language(options.language.clone());
    if let Some(instruct) = options.instruct.as_deref().filter(|s| !s.is_empty()) {
        builder.instruct(instruct);
    }
    if engine.engine_id.mode() == GenerationMode::Cloning {
        let reference = ReferenceResolver::new(aliases).resolve(
            &voice,
            options.ref_audio.as_deref(),
            options.ref_text.as_deref(),
        )?;
        builder
            .reference_audio_path(reference.audio_path)
            .reference_text(reference.text);
    }
    let request = builder.build()?;

    let mut model = loader.load_model(request.model_id())?;
    let chunks = dispatch(model.as_mut(), &request)?;

    write_chunks(chunks, &output_path, request.sample_rate())
}

/// Speak the reference paragraph with a direct-synthesis model and write it to `options.out`.
pub fn generate_reference(options: &ReferenceOptions, loader: &dyn ModelLoader) -> Result<SynthesisReport> {
    let request = GenerationRequest::builder()
        .text(options.text())
        .engine_id(EngineId::Kokoro)
        .model_id(options.model.clone())
        .voice(options.voice.clone())
        .speed(options.speed)
        .sample_rate(options.sample_rate)
        .build()?;

    log::info!("Generating reference audio with voice '{}'...", request.voice());
    let mut model = loader.load_model(request.model_id())?;
    let chunks = dispatch(model.as_mut(), &request)?;

    write_chunks(chunks, &options.out, request.sample_rate())
}

fn write_chunks(
    chunks: Vec<crate::AudioChunk>,
    output_path: &Path,
    sample_rate: u32,
) -> Result<SynthesisReport> {
    let audio = assemble(chunks)?;
    write_audio(output_path, &audio, sample_rate)?;

    Ok(SynthesisReport {
        output_path: output_path.to_path_buf(),
        sample_rate,
        samples: audio.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phoneme_text_is_one_paragraph() {
        assert!(PHONEME_TEXT.starts_with("The rain arrived early on Tuesday"));
        assert!(PHONEME_TEXT.ends_with("felt grateful for a quiet day."));
        assert!(!PHONEME_TEXT.contains("  "));
        assert!(!PHONEME_TEXT.contains('\n'));
    }

    #[test]
    fn reference_defaults_follow_kokoro_engine() {
        let options = ReferenceOptions::default();
        assert_eq!(options.model, "mlx-community/Kokoro-82M-bf16");
        assert_eq!(options.voice, "af_heart");
        assert_eq!(options.out, PathBuf::from("reference.wav"));
        assert_eq!(options.text(), PHONEME_TEXT);
    }

    #[test]
    fn empty_reference_text_speaks_phoneme_text() {
        let options = ReferenceOptions {
            text: Some(String::new()),
            ..ReferenceOptions::default()
        };
        assert_eq!(options.text(), PHONEME_TEXT);

        let options = ReferenceOptions {
            text: Some("Short custom line.".to_string()),
            ..ReferenceOptions::default()
        };
        assert_eq!(options.text(), "Short custom line.");
    }

    #[test]
    fn input_text_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        fs::write(&path, "\n  Hello world.  \n").unwrap();
        assert_eq!(read_input_text(&path).unwrap(), "Hello world.");
    }

    #[test]
    fn whitespace_only_input_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        fs::write(&path, " \n\t ").unwrap();
        assert!(matches!(read_input_text(&path), Err(TtsError::EmptyInput(p)) if p == path));
    }

    #[test]
    fn report_duration() {
        let report = SynthesisReport {
            output_path: PathBuf::from("x.wav"),
            sample_rate: 24000,
            samples: 36000,
        };
        assert_eq!(report.duration_secs(), 1.5);
    }
}
