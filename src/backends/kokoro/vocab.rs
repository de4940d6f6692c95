use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::model::KokoroError;

#[derive(Debug, Deserialize)]
struct KokoroConfig {
    vocab: HashMap<String, i64>,
}

/// Load the IPA-character vocabulary from a Kokoro `config.json`.
pub fn load_vocab(config_path: &Path) -> Result<HashMap<char, i64>, KokoroError> {
    let content = std::fs::read_to_string(config_path)?;
    parse_vocab(&content)
}

fn parse_vocab(content: &str) -> Result<HashMap<char, i64>, KokoroError> {
    let config: KokoroConfig =
        serde_json::from_str(content).map_err(|e| KokoroError::Config(e.to_string()))?;

    config
        .vocab
        .into_iter()
        .map(|(key, id)| {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Ok((ch, id)),
                _ => Err(KokoroError::Config(format!(
                    "vocab key {key:?} is not a single character"
                ))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vocab_object() {
        let vocab = parse_vocab(r#"{"n_token": 178, "vocab": {";": 1, "ə": 83, " ": 16}}"#).unwrap();
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab[&'ə'], 83);
        assert_eq!(vocab[&' '], 16);
    }

    #[test]
    fn rejects_missing_vocab_and_multichar_keys() {
        assert!(matches!(parse_vocab("{}"), Err(KokoroError::Config(_))));
        assert!(matches!(
            parse_vocab(r#"{"vocab": {"ab": 1}}"#),
            Err(KokoroError::Config(msg)) if msg.contains("\"ab\"")
        ));
    }
}
