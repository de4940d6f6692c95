//! Voice aliases for reference-based cloning.
//!
//! A voice alias maps a well-known voice name to a bundled reference recording
//! and its transcript. Lookups never fail: unknown names get the default alias,
//! and callers check the returned audio path themselves.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Name of the alias every unknown voice falls back to.
pub const DEFAULT_ALIAS: &str = "af_heart";

/// A named shortcut to reference material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceAlias {
    pub voice_name: String,
    pub reference_audio_path: PathBuf,
    /// Either a path to a transcript file or the transcript itself.
    pub reference_text_source: String,
}

/// Immutable alias table with a guaranteed default entry.
#[derive(Debug, Clone)]
pub struct VoiceAliasRegistry {
    aliases: HashMap<String, VoiceAlias>,
    default: VoiceAlias,
}

#[derive(Debug, Deserialize)]
struct AliasFileEntry {
    ref_audio: PathBuf,
    ref_text: String,
}

impl VoiceAliasRegistry {
    /// Registry holding the bundled `af_heart` reference under `project_root/reference/`.
    pub fn builtin(project_root: impl AsRef<Path>) -> Self {
        let reference_dir = project_root.as_ref().join("reference");
        let default = VoiceAlias {
            voice_name: DEFAULT_ALIAS.to_string(),
            reference_audio_path: reference_dir.join("af_heart-core-clarity-90s.wav"),
            reference_text_source: reference_dir
                .join("af_heart-core-clarity-90s.txt")
                .to_string_lossy()
                .into_owned(),
        };
        Self::with_default(default)
    }

    /// Registry whose only entry, and fallback, is `default`.
    pub fn with_default(default: VoiceAlias) -> Self {
        let mut aliases = HashMap::new();
        aliases.insert(default.voice_name.clone(), default.clone());
        Self { aliases, default }
    }

    /// Add or replace an alias.
    pub fn with_alias(mut self, alias: VoiceAlias) -> Self {
        if alias.voice_name == self.default.voice_name {
            self.default = alias.clone();
        }
        self.aliases.insert(alias.voice_name.clone(), alias);
        self
    }

    /// Extend the registry from a JSON alias file.
    ///
    /// The file maps voice names to `{"ref_audio": ..., "ref_text": ...}`.
    /// Relative `ref_audio` paths resolve against the file's directory, as do
    /// `ref_text` values that name an existing file there.
    pub fn extend_from_json_file(self, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let entries: HashMap<String, AliasFileEntry> = serde_json::from_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        let mut registry = self;
        for (voice_name, entry) in entries {
            let reference_text_source = {
                let candidate = base.join(&entry.ref_text);
                if Path::new(&entry.ref_text).is_relative() && candidate.is_file() {
                    candidate.to_string_lossy().into_owned()
                } else {
                    entry.ref_text
                }
            };
            registry = registry.with_alias(VoiceAlias {
                voice_name,
                reference_audio_path: base.join(entry.ref_audio),
                reference_text_source,
            });
        }

        log::info!(
            "Loaded voice aliases from {}: {}",
            path.display(),
            registry.names().join(", ")
        );
        Ok(registry)
    }

    /// Alias for `voice_name`, or the default alias when none is registered.
    pub fn lookup(&self, voice_name: &str) -> &VoiceAlias {
        self.aliases.get(voice_name).unwrap_or_else(|| {
            log::warn!(
                "No alias for voice '{}', using '{}'",
                voice_name,
                self.default.voice_name
            );
            &self.default
        })
    }

    pub fn default_alias(&self) -> &VoiceAlias {
        &self.default
    }

    /// Registered alias names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.aliases.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_alias_points_into_reference_dir() {
        let registry = VoiceAliasRegistry::builtin("/opt/tts");
        let alias = registry.lookup("af_heart");
        assert_eq!(
            alias.reference_audio_path,
            PathBuf::from("/opt/tts/reference/af_heart-core-clarity-90s.wav")
        );
        assert!(alias.reference_text_source.ends_with("af_heart-core-clarity-90s.txt"));
    }

    #[test]
    fn unknown_voice_falls_back_to_default() {
        let registry = VoiceAliasRegistry::builtin("/opt/tts");
        assert_eq!(registry.lookup("Vivian"), registry.default_alias());
        assert_eq!(registry.lookup(""), registry.default_alias());
    }

    #[test]
    fn registered_alias_wins_over_default() {
        let registry = VoiceAliasRegistry::builtin("/opt/tts").with_alias(VoiceAlias {
            voice_name: "bf_emma".to_string(),
            reference_audio_path: PathBuf::from("/voices/emma.wav"),
            reference_text_source: "Hello from Emma.".to_string(),
        });
        let alias = registry.lookup("bf_emma");
        assert_eq!(alias.reference_audio_path, PathBuf::from("/voices/emma.wav"));
        assert_eq!(registry.names(), vec!["af_heart", "bf_emma"]);
    }

    #[test]
    fn alias_file_paths_resolve_against_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("emma.txt"), "Transcript").unwrap();
        let file = dir.path().join("aliases.json");
        fs::write(
            &file,
            r#"{
                "bf_emma": {"ref_audio": "emma.wav", "ref_text": "emma.txt"},
                "am_adam": {"ref_audio": "/abs/adam.wav", "ref_text": "Inline words"}
            }"#,
        )
        .unwrap();

        let registry = VoiceAliasRegistry::builtin("/opt/tts")
            .extend_from_json_file(&file)
            .unwrap();

        let emma = registry.lookup("bf_emma");
        assert_eq!(emma.reference_audio_path, dir.path().join("emma.wav"));
        assert_eq!(
            PathBuf::from(&emma.reference_text_source),
            dir.path().join("emma.txt")
        );

        let adam = registry.lookup("am_adam");
        assert_eq!(adam.reference_audio_path, PathBuf::from("/abs/adam.wav"));
        assert_eq!(adam.reference_text_source, "Inline words");
    }

    #[test]
    fn malformed_alias_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("aliases.json");
        fs::write(&file, "[1, 2]").unwrap();
        let err = VoiceAliasRegistry::builtin("/opt/tts")
            .extend_from_json_file(&file)
            .unwrap_err();
        assert!(matches!(err, crate::TtsError::AliasFile(_)));
    }
}
