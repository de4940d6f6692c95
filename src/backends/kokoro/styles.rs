use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::model::KokoroError;

/// Style vector dimension for Kokoro.
pub const STYLE_DIM: usize = 256;

const NPY_MAGIC: &[u8] = b"\x93NUMPY";

/// Voice style vectors, indexed by phoneme token count.
pub struct StyleStore {
    voices: HashMap<String, Vec<[f32; STYLE_DIM]>>,
}

impl StyleStore {
    /// Load every `{voice}.npy` entry of a numpy zip archive.
    pub fn load(path: &Path) -> Result<Self, KokoroError> {
        let mut archive = zip::ZipArchive::new(File::open(path)?)
            .map_err(|e| KokoroError::VoiceParse(format!("Failed to open zip archive: {e}")))?;

        let mut voices = HashMap::new();
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| KokoroError::VoiceParse(format!("Failed to read zip entry {i}: {e}")))?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let voice = name.trim_end_matches(".npy").to_string();
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            voices.insert(voice, parse_npy(&data, &name)?);
        }

        log::info!("Loaded {} voices", voices.len());
        Ok(Self { voices })
    }

    /// Style row `idx` of `voice`, clamped to the last available row.
    pub fn get_style(&self, voice: &str, idx: usize) -> Result<[f32; STYLE_DIM], KokoroError> {
        let rows = self
            .voices
            .get(voice)
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| KokoroError::VoiceNotFound {
                voice: voice.to_string(),
                available: self.list_voices().join(", "),
            })?;
        Ok(rows[idx.min(rows.len() - 1)])
    }

    pub fn list_voices(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.voices.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Parse a little-endian float32 `.npy` array of shape `[N, 256]`.
fn parse_npy(data: &[u8], name: &str) -> Result<Vec<[f32; STYLE_DIM]>, KokoroError> {
    let invalid = |msg: String| KokoroError::VoiceParse(format!("{name}: {msg}"));

    if data.len() < 10 || &data[..6] != NPY_MAGIC {
        return Err(invalid("not a numpy array".to_string()));
    }
    let header_len = u16::from_le_bytes([data[8], data[9]]) as usize;
    let body = data
        .get(10 + header_len..)
        .ok_or_else(|| invalid(format!("header truncated ({} bytes)", data.len())))?;

    let row_bytes = STYLE_DIM * 4;
    if body.len() % row_bytes != 0 {
        return Err(invalid(format!(
            "{} data bytes is not a whole number of {STYLE_DIM}-float rows",
            body.len()
        )));
    }

    Ok(body
        .chunks_exact(row_bytes)
        .map(|row| {
            let mut style = [0f32; STYLE_DIM];
            for (dst, bytes) in style.iter_mut().zip(row.chunks_exact(4)) {
                *dst = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            }
            style
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn npy(rows: usize, value: f32) -> Vec<u8> {
        let header = b"{'descr': '<f4', 'fortran_order': False, 'shape': (1, 256), }\n";
        let mut data = NPY_MAGIC.to_vec();
        data.extend_from_slice(&[1, 0]);
        data.extend_from_slice(&(header.len() as u16).to_le_bytes());
        data.extend_from_slice(header);
        for r in 0..rows {
            for _ in 0..STYLE_DIM {
                data.extend_from_slice(&(value + r as f32).to_le_bytes());
            }
        }
        data
    }

    #[test]
    fn parses_rows() {
        let rows = parse_npy(&npy(3, 0.5), "af_heart.npy").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][0], 2.5);
    }

    #[test]
    fn rejects_bad_magic_and_partial_rows() {
        assert!(parse_npy(b"not numpy at all", "x.npy").is_err());
        let mut data = npy(1, 0.0);
        data.pop();
        assert!(matches!(
            parse_npy(&data, "x.npy"),
            Err(KokoroError::VoiceParse(msg)) if msg.starts_with("x.npy")
        ));
    }

    #[test]
    fn loads_archive_and_clamps_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voices-v1.0.bin");
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        writer.start_file("af_heart.npy", zip::write::SimpleFileOptions::default()).unwrap();
        writer.write_all(&npy(2, 1.0)).unwrap();
        writer.start_file("bf_emma.npy", zip::write::SimpleFileOptions::default()).unwrap();
        writer.write_all(&npy(1, 7.0)).unwrap();
        writer.finish().unwrap();

        let store = StyleStore::load(&path).unwrap();
        assert_eq!(store.list_voices(), vec!["af_heart", "bf_emma"]);
        assert_eq!(store.get_style("af_heart", 99).unwrap()[0], 2.0);
        let err = store.get_style("missing", 0).unwrap_err();
        assert!(matches!(&err, KokoroError::VoiceNotFound { voice, .. } if voice == "missing"));
        assert_eq!(
            err.to_string(),
            "Voice 'missing' not found in voices-v1.0.bin (available: af_heart, bf_emma)"
        );
    }
}
