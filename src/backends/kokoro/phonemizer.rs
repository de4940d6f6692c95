use std::collections::HashMap;
use std::io::Write;
use std::process::{Command, Stdio};

use super::model::KokoroError;

/// espeak-ng language for a Kokoro voice, from its two-letter prefix.
pub fn voice_lang(voice: &str) -> &'static str {
    match voice.get(..2).unwrap_or("") {
        "af" | "am" => "en-us",
        "bf" | "bm" => "en-gb",
        "ef" | "em" => "es",
        "ff" => "fr",
        "hf" | "hm" => "hi",
        "if" | "im" => "it",
        "jf" | "jm" => "ja",
        "pf" | "pm" => "pt-br",
        "zf" | "zm" => "cmn",
        _ => "en-us",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Words(String),
    Punct(char),
}

/// Convert text to Kokoro token ids.
///
/// Punctuation is kept as its own token so pauses survive phonemization;
/// the words between punctuation go through espeak-ng in one batch, one
/// segment per line. IPA characters missing from `vocab` are dropped.
pub fn phonemize(
    text: &str,
    lang: &str,
    vocab: &HashMap<char, i64>,
) -> Result<Vec<i64>, KokoroError> {
    let pieces = split_pieces(text);
    let segments: Vec<&str> = pieces
        .iter()
        .filter_map(|piece| match piece {
            Piece::Words(words) => Some(words.as_str()),
            Piece::Punct(_) => None,
        })
        .collect();
    if segments.is_empty() && pieces.is_empty() {
        return Ok(Vec::new());
    }

    let mut phonemes = phonemize_segments(&segments, lang)?.into_iter();
    let mut ids = Vec::new();
    for piece in &pieces {
        match piece {
            Piece::Words(_) => {
                if let Some(ipa) = phonemes.next() {
                    ids.extend(
                        ipa.chars()
                            .filter(|ch| *ch != '_')
                            .filter_map(|ch| vocab.get(&ch).copied()),
                    );
                }
            }
            Piece::Punct(ch) => ids.extend(vocab.get(ch).copied()),
        }
    }

    Ok(ids)
}

fn split_pieces(text: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut words = String::new();
    let chars: Vec<char> = text.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        let between_digits = matches!(ch, '.' | ',')
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());

        match boundary(ch) {
            Some(punct) if !between_digits => {
                push_words(&mut pieces, &mut words);
                pieces.push(Piece::Punct(punct));
            }
            _ if ch.is_whitespace() => {
                if !words.is_empty() && !words.ends_with(' ') {
                    words.push(' ');
                }
            }
            _ => words.push(ch),
        }
    }

    push_words(&mut pieces, &mut words);
    pieces
}

fn push_words(pieces: &mut Vec<Piece>, words: &mut String) {
    let trimmed = words.trim();
    if !trimmed.is_empty() {
        pieces.push(Piece::Words(trimmed.to_string()));
    }
    words.clear();
}

fn boundary(ch: char) -> Option<char> {
    match ch {
        '.' | '!' | '?' | ',' | ';' | ':' | '—' | '…' | '"' | '(' | ')' | '\u{201c}'
        | '\u{201d}' => Some(ch),
        '\n' | '\r' => Some('.'),
        _ => None,
    }
}

/// IPA for each segment, in order.
fn phonemize_segments(segments: &[&str], lang: &str) -> Result<Vec<String>, KokoroError> {
    if segments.is_empty() {
        return Ok(Vec::new());
    }

    let output = run_espeak(&segments.join("\n"), lang)?;
    let lines: Vec<String> = output.lines().map(|l| l.trim().to_string()).collect();
    if lines.len() == segments.len() {
        return Ok(lines);
    }

    // espeak-ng merged or split lines; fall back to one call per segment.
    log::debug!(
        "espeak-ng returned {} lines for {} segments, retrying individually",
        lines.len(),
        segments.len()
    );
    segments
        .iter()
        .map(|segment| Ok(run_espeak(segment, lang)?.split_whitespace().collect::<Vec<_>>().join(" ")))
        .collect()
}

fn run_espeak(input: &str, lang: &str) -> Result<String, KokoroError> {
    let mut child = Command::new("espeak-ng")
        .args(["--ipa", "--stdin", "-q", "-v", lang])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => KokoroError::EspeakNotFound,
            _ => KokoroError::Io(e),
        })?;

    if let Some(mut stdin) = child.stdin.take() {
        // The last line is under-processed without a terminating newline.
        stdin.write_all(input.as_bytes())?;
        if !input.ends_with('\n') {
            stdin.write_all(b"\n")?;
        }
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(KokoroError::PhonemizerFailed(format!(
            "espeak-ng exited with code {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Piece {
        Piece::Words(s.to_string())
    }

    #[test]
    fn maps_voice_prefix_to_language() {
        assert_eq!(voice_lang("af_heart"), "en-us");
        assert_eq!(voice_lang("bf_emma"), "en-gb");
        assert_eq!(voice_lang("zf_xiaobei"), "cmn");
        assert_eq!(voice_lang("Vivian"), "en-us");
        assert_eq!(voice_lang("x"), "en-us");
    }

    #[test]
    fn splits_words_and_punctuation() {
        assert_eq!(
            split_pieces("Hello, world. Testing!"),
            vec![
                words("Hello"),
                Piece::Punct(','),
                words("world"),
                Piece::Punct('.'),
                words("Testing"),
                Piece::Punct('!'),
            ]
        );
    }

    #[test]
    fn keeps_number_separators_inside_words() {
        assert_eq!(
            split_pieces("Version 2.0 reached 1,000 users."),
            vec![words("Version 2.0 reached 1,000 users"), Piece::Punct('.')]
        );
    }

    #[test]
    fn newlines_become_sentence_breaks() {
        assert_eq!(
            split_pieces("first line\nsecond   line"),
            vec![words("first line"), Piece::Punct('.'), words("second line")]
        );
    }

    #[test]
    fn punctuation_only_text_needs_no_espeak() {
        let vocab: HashMap<char, i64> = [('.', 4), ('!', 5)].into_iter().collect();
        assert_eq!(phonemize("...!", "en-us", &vocab).unwrap(), vec![4, 4, 4, 5]);
        assert!(phonemize("   ", "en-us", &vocab).unwrap().is_empty());
    }
}
