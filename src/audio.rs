use std::path::Path;

use crate::error::{Result, TtsError};

/// One unit of audio produced by a generation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioChunk {
    /// Raw audio samples as f32 values
    pub samples: Vec<f32>,
}

impl AudioChunk {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<f32>> for AudioChunk {
    fn from(samples: Vec<f32>) -> Self {
        Self { samples }
    }
}

/// Concatenate chunk samples in order into one contiguous buffer.
///
/// No resampling or channel mixing happens here. An empty chunk sequence is
/// an error: a zero-chunk generation is never written to disk.
pub fn assemble<I>(chunks: I) -> Result<Vec<f32>>
where
    I: IntoIterator<Item = AudioChunk>,
{
    let mut chunks = chunks.into_iter().peekable();
    if chunks.peek().is_none() {
        return Err(TtsError::EmptyGeneration);
    }

    let mut buffer = Vec::new();
    let mut count = 0usize;
    for chunk in chunks {
        buffer.extend_from_slice(&chunk.samples);
        count += 1;
    }

    log::debug!("Assembled {} samples from {} chunks", buffer.len(), count);
    Ok(buffer)
}

/// Write mono samples to a 32-bit float WAV file.
pub fn write_audio(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Duration of `sample_count` samples in seconds.
pub fn duration_secs(sample_count: usize, sample_rate: u32) -> f64 {
    sample_count as f64 / sample_rate as f64
}
