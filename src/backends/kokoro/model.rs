use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ndarray::{arr1, Array2, ArrayView2};
use ort::execution_providers::CPUExecutionProvider;
use ort::inputs;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;

use super::phonemizer::{phonemize, voice_lang};
use super::styles::{StyleStore, STYLE_DIM};

/// Maximum number of phoneme tokens per window (before padding).
const MAX_PHONEME_LEN: usize = 510;

/// Vocabulary ids of `; : , . ! ?`, the preferred window boundaries.
const PUNCT_IDS: &[i64] = &[1, 2, 3, 4, 5, 6];

#[derive(thiserror::Error, Debug)]
pub enum KokoroError {
    #[error("ONNX runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EspeakNotFound,
    #[error("Phonemization failed: {0}")]
    PhonemizerFailed(String),
    #[error("Voice '{voice}' not found in voices-v1.0.bin (available: {available})")]
    VoiceNotFound { voice: String, available: String },
    #[error("Invalid config.json: {0}")]
    Config(String),
    #[error("Failed to parse voice file: {0}")]
    VoiceParse(String),
    #[error("Missing model file: {}", .0.display())]
    MissingFile(PathBuf),
}

/// ONNX session plus the voice styles and vocabulary it needs.
pub(super) struct KokoroSession {
    session: Session,
    styles: StyleStore,
    vocab: HashMap<char, i64>,
    /// "input_ids" or "tokens", depending on the export
    tokens_input_name: String,
    speed_is_int32: bool,
}

impl KokoroSession {
    pub(super) fn load(model_dir: &Path, num_threads: Option<usize>) -> Result<Self, KokoroError> {
        let onnx_path = find_onnx_file(model_dir)?;
        log::info!("Loading Kokoro graph from {}", onnx_path.display());
        let session = init_session(&onnx_path, num_threads)?;

        let tokens_input_name = session
            .inputs()
            .into_iter()
            .map(|input| input.name())
            .find(|name| *name == "input_ids" || *name == "tokens")
            .unwrap_or("input_ids")
            .to_string();
        // Newer exports take an int32 speed; assume that when the input is not described.
        let speed_is_int32 = session
            .inputs()
            .into_iter()
            .find(|input| input.name() == "speed")
            .map(|input| format!("{:?}", input.dtype()).to_lowercase().contains("int32"))
            .unwrap_or(true);
        log::debug!("tokens_input='{tokens_input_name}', speed_is_int32={speed_is_int32}");

        let styles = StyleStore::load(&require(model_dir.join("voices-v1.0.bin"))?)?;
        let vocab = super::vocab::load_vocab(&require(model_dir.join("config.json"))?)?;

        Ok(Self {
            session,
            styles,
            vocab,
            tokens_input_name,
            speed_is_int32,
        })
    }

    /// Synthesize `text`, returning one sample buffer per phoneme window.
    pub(super) fn synthesize_windows(
        &mut self,
        text: &str,
        voice: &str,
        speed: f32,
    ) -> Result<Vec<Vec<f32>>, KokoroError> {
        let ids = phonemize(text, voice_lang(voice), &self.vocab)?;
        if ids.is_empty() {
            log::warn!("No phoneme tokens produced for text: {text:?}");
            return Ok(Vec::new());
        }

        // One style row for the whole text keeps prosody stable across windows.
        let style = self.styles.get_style(voice, ids.len())?;
        let windows = split_windows(&ids);
        log::debug!(
            "Synthesizing {} phoneme tokens in {} window(s)",
            ids.len(),
            windows.len()
        );

        windows
            .iter()
            .map(|window| self.run_window(window, &style, speed))
            .collect()
    }

    fn run_window(
        &mut self,
        tokens: &[i64],
        style: &[f32; STYLE_DIM],
        speed: f32,
    ) -> Result<Vec<f32>, KokoroError> {
        // [[0, t1..tN, 0]]
        let mut padded = Vec::with_capacity(tokens.len() + 2);
        padded.push(0);
        padded.extend_from_slice(tokens);
        padded.push(0);
        let tokens_arr = Array2::from_shape_vec((1, padded.len()), padded)?;
        let style_view = ArrayView2::from_shape((1, STYLE_DIM), style.as_slice())?;

        let outputs = if self.speed_is_int32 {
            let speed_arr = arr1(&[speed.round() as i32]);
            self.session.run(inputs![
                self.tokens_input_name.as_str() => TensorRef::from_array_view(tokens_arr.view())?,
                "style" => TensorRef::from_array_view(style_view)?,
                "speed" => TensorRef::from_array_view(speed_arr.view())?,
            ])?
        } else {
            let speed_arr = arr1(&[speed]);
            self.session.run(inputs![
                self.tokens_input_name.as_str() => TensorRef::from_array_view(tokens_arr.view())?,
                "style" => TensorRef::from_array_view(style_view)?,
                "speed" => TensorRef::from_array_view(speed_arr.view())?,
            ])?
        };

        let (_, waveform) = outputs
            .iter()
            .next()
            .ok_or_else(|| KokoroError::Ort(ort::Error::new("No output from model")))?;
        let waveform = waveform.try_extract_array::<f32>()?;
        Ok(waveform.iter().copied().collect())
    }
}

fn require(path: PathBuf) -> Result<PathBuf, KokoroError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(KokoroError::MissingFile(path))
    }
}

/// Prefers `kokoro-quant-convinteger.onnx`, then the first `.onnx` file in the directory.
fn find_onnx_file(model_dir: &Path) -> Result<PathBuf, KokoroError> {
    let preferred = model_dir.join("kokoro-quant-convinteger.onnx");
    if preferred.is_file() {
        return Ok(preferred);
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(model_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("onnx"))
        .collect();
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| KokoroError::MissingFile(model_dir.join("*.onnx")))
}

fn init_session(onnx_path: &Path, num_threads: Option<usize>) -> Result<Session, KokoroError> {
    let mut builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_execution_providers([CPUExecutionProvider::default().build()])?
        .with_parallel_execution(true)?;

    if let Some(threads) = num_threads {
        builder = builder
            .with_intra_threads(threads)?
            .with_inter_threads(threads)?;
    }

    Ok(builder.commit_from_file(onnx_path)?)
}

/// Split ids into windows of at most `MAX_PHONEME_LEN`, cutting after punctuation when possible.
fn split_windows(ids: &[i64]) -> Vec<Vec<i64>> {
    let mut windows = Vec::new();
    let mut rest = ids;

    while rest.len() > MAX_PHONEME_LEN {
        let cut = rest[..MAX_PHONEME_LEN]
            .iter()
            .rposition(|id| PUNCT_IDS.contains(id))
            .map(|i| i + 1)
            .unwrap_or(MAX_PHONEME_LEN);
        windows.push(rest[..cut].to_vec());
        rest = &rest[cut..];
    }
    if !rest.is_empty() {
        windows.push(rest.to_vec());
    }

    windows
}
