//! Convert a text file to speech using Kokoro or Qwen3 TTS, producing a WAV file.
//!
//! ```text
//! tts-record input.txt -o output.wav
//! tts-record input.txt --voice af_sky --speed 0.9
//! tts-record input.txt --engine qwen3-clone
//! tts-record input.txt --engine qwen3-clone --ref-audio my_voice.wav
//! tts-record input.txt --engine qwen3-custom --voice Vivian --instruct "Very happy"
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use tts_record::backends::{LocalModelLoader, ModelParams, DEFAULT_MODELS_DIR};
use tts_record::engine::{EngineId, EngineTable};
use tts_record::pipeline::{synthesize_file, SynthesisOptions, DEFAULT_LANGUAGE, DEFAULT_SAMPLE_RATE};
use tts_record::voices::VoiceAliasRegistry;

/// Convert a text file to speech using Kokoro or Qwen3 TTS.
#[derive(Parser, Debug)]
#[command(name = "tts-record", version, about, long_about = None)]
struct Cli {
    /// Path to the input text file
    input_file: PathBuf,

    /// Output WAV file path (default: {input_dir}/{date}-{inputfile}-{model}.wav)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// TTS engine: kokoro, qwen3-clone (voice cloning), qwen3-custom (predefined speakers with instruct)
    #[arg(long, value_enum, default_value_t = EngineId::Kokoro)]
    engine: EngineId,

    /// Voice name (default: af_heart for kokoro/qwen3-clone, Vivian for qwen3-custom)
    #[arg(long)]
    voice: Option<String>,

    /// Speech speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Language for qwen3-clone/qwen3-custom
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Override reference audio path for qwen3-clone
    #[arg(long)]
    ref_audio: Option<PathBuf>,

    /// Reference transcript for qwen3-clone: inline text or path to .txt file
    #[arg(long)]
    ref_text: Option<String>,

    /// Emotion/style instruction for qwen3-clone/qwen3-custom (e.g. "Very happy and excited.")
    #[arg(long)]
    instruct: Option<String>,

    /// Directory holding downloaded models
    #[arg(long, env = "TTS_RECORD_MODELS_DIR", default_value = DEFAULT_MODELS_DIR)]
    models_dir: PathBuf,

    /// CPU threads for local inference (default: all cores)
    #[arg(long, env = "TTS_RECORD_THREADS")]
    threads: Option<usize>,

    /// Project root containing the bundled reference/ directory
    #[arg(long, env = "TTS_RECORD_ROOT", default_value = ".")]
    project_root: PathBuf,

    /// JSON file with additional voice aliases for qwen3-clone
    #[arg(long)]
    aliases: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut aliases = VoiceAliasRegistry::builtin(&cli.project_root);
    if let Some(path) = &cli.aliases {
        aliases = aliases
            .extend_from_json_file(path)
            .with_context(|| format!("Failed to load voice aliases from {}", path.display()))?;
    }

    let options = SynthesisOptions {
        input_file: cli.input_file,
        out: cli.out,
        engine: cli.engine,
        voice: cli.voice,
        speed: cli.speed,
        sample_rate: cli.sample_rate,
        language: cli.language,
        ref_audio: cli.ref_audio,
        ref_text: cli.ref_text,
        instruct: cli.instruct,
    };
    let loader = LocalModelLoader::new(cli.models_dir).with_params(ModelParams {
        num_threads: cli.threads,
    });

    let report = synthesize_file(&options, &EngineTable::default(), &aliases, &loader)
        .with_context(|| format!("Failed to synthesize {}", options.input_file.display()))?;

    println!(
        "Wrote {} ({} Hz, {:.2}s)",
        report.output_path.display(),
        report.sample_rate,
        report.duration_secs()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_engine_and_thread_flags() {
        let cli = Cli::try_parse_from([
            "tts-record",
            "story.txt",
            "--engine",
            "qwen3-custom",
            "--threads",
            "4",
        ])
        .unwrap();
        assert_eq!(cli.engine, EngineId::Qwen3Custom);
        assert_eq!(cli.threads, Some(4));
        assert_eq!(cli.sample_rate, DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn rejects_unknown_engine() {
        assert!(Cli::try_parse_from(["tts-record", "story.txt", "--engine", "piper"]).is_err());
    }
}
