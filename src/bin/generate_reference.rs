//! Generate a reference recording for voice cloning using Kokoro TTS.
//!
//! The default text is a phonetically rich paragraph covering most English
//! phonemes, which makes the output a good cloning reference.
//!
//! ```text
//! generate-reference --voice af_heart --out reference/af_heart.wav
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use tts_record::backends::{LocalModelLoader, ModelParams, DEFAULT_MODELS_DIR};
use tts_record::pipeline::{generate_reference, ReferenceOptions, DEFAULT_SAMPLE_RATE};

const RULE: &str = "----------------------------------------";

/// Generate reference audio for voice cloning.
#[derive(Parser, Debug)]
#[command(name = "generate-reference", version, about, long_about = None)]
struct Cli {
    /// Kokoro model id
    #[arg(long, default_value = "mlx-community/Kokoro-82M-bf16")]
    model: String,

    /// Kokoro voice id
    #[arg(long, default_value = "af_heart")]
    voice: String,

    /// TTS speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Output sample rate
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Custom text to speak. If not provided, uses the phoneme-rich default
    #[arg(long)]
    text: Option<String>,

    /// Output WAV file path
    #[arg(long, default_value = "reference.wav")]
    out: PathBuf,

    /// Print the reference text and exit
    #[arg(long)]
    print_text: bool,

    /// Directory holding downloaded models
    #[arg(long, env = "TTS_RECORD_MODELS_DIR", default_value = DEFAULT_MODELS_DIR)]
    models_dir: PathBuf,

    /// CPU threads for local inference (default: all cores)
    #[arg(long, env = "TTS_RECORD_THREADS")]
    threads: Option<usize>,
}

fn print_text(text: &str) {
    println!("{RULE}");
    println!("{text}");
    println!("{RULE}");
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = ReferenceOptions {
        model: cli.model,
        voice: cli.voice,
        speed: cli.speed,
        sample_rate: cli.sample_rate,
        text: cli.text,
        out: cli.out,
    };

    if cli.print_text {
        println!("Phoneme-rich reference text:");
        print_text(options.text());
        return Ok(());
    }

    let preview: String = options.text().chars().take(80).collect();
    log::info!("Text: {preview}...");

    let loader = LocalModelLoader::new(cli.models_dir).with_params(ModelParams {
        num_threads: cli.threads,
    });
    let report = generate_reference(&options, &loader)
        .with_context(|| format!("Failed to generate {}", options.out.display()))?;

    println!("Wrote {} ({} Hz)", report.output_path.display(), report.sample_rate);
    println!();
    println!("Reference text (save this for --ref-text):");
    print_text(options.text());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_kokoro_reference() {
        let cli = Cli::try_parse_from(["generate-reference", "--threads", "2"]).unwrap();
        assert_eq!(cli.model, "mlx-community/Kokoro-82M-bf16");
        assert_eq!(cli.voice, "af_heart");
        assert_eq!(cli.out, PathBuf::from("reference.wav"));
        assert_eq!(cli.threads, Some(2));
        assert!(cli.text.is_none());
    }
}
