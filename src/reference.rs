//! Reference material resolution for voice cloning.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TtsError};
use crate::voices::VoiceAliasRegistry;

/// Reference audio and transcript ready for a cloning request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedReference {
    pub audio_path: PathBuf,
    pub text: String,
}

/// Resolves explicit overrides and voice aliases into validated reference material.
pub struct ReferenceResolver<'a> {
    aliases: &'a VoiceAliasRegistry,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(aliases: &'a VoiceAliasRegistry) -> Self {
        Self { aliases }
    }

    /// Pick the reference audio and transcript for `voice`.
    ///
    /// Explicit values take precedence over the voice's alias; an empty
    /// explicit value counts as not given. The transcript
    /// source is read as a file when one exists at that path; a source that
    /// looks like a path but names no file is an error; anything else is the
    /// transcript itself.
    pub fn resolve(
        &self,
        voice: &str,
        explicit_ref_audio: Option<&Path>,
        explicit_ref_text: Option<&str>,
    ) -> Result<ResolvedReference> {
        let alias = self.aliases.lookup(voice);

        let audio_path = explicit_ref_audio
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| alias.reference_audio_path.clone());
        if !audio_path.is_file() {
            return Err(TtsError::MissingReferenceAudio(audio_path));
        }

        let text_source = explicit_ref_text
            .filter(|s| !s.is_empty())
            .unwrap_or(alias.reference_text_source.as_str());
        let text = read_reference_text(text_source)?;
        if text.is_empty() {
            return Err(TtsError::EmptyReferenceText);
        }

        log::info!("Reference audio: {}", audio_path.display());
        Ok(ResolvedReference { audio_path, text })
    }
}

/// Classify a transcript source as a file to read or literal text.
///
/// An existing file always wins, even when the source would also read as a
/// plain sentence.
pub fn read_reference_text(source: &str) -> Result<String> {
    let path = Path::new(source);
    if path.is_file() {
        return Ok(fs::read_to_string(path)?.trim().to_string());
    }
    if looks_like_path(source) {
        return Err(TtsError::MissingReferenceText(source.to_string()));
    }
    Ok(source.trim().to_string())
}

/// A `.txt` suffix or any path separator marks the source as a file reference.
///
/// A literal transcript containing a slash is misread as a path; the single
/// `--ref-text` flag accepts both forms and this is the accepted ambiguity.
pub fn looks_like_path(source: &str) -> bool {
    source.ends_with(".txt") || source.contains('/') || source.contains('\\')
}
