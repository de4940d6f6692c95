//! Default output path derivation.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

/// Default output path beside the input file, dated today.
///
/// See [`resolve_output_path_on`] for the layout.
pub fn resolve_output_path(input_file: &Path, model_id: &str) -> PathBuf {
    resolve_output_path_on(input_file, model_id, Local::now().date_naive())
}

/// Default output path for a fixed date:
/// `{input_dir}/{YYYY-MM-DD}-{input_stem}-{model_suffix}.wav`.
///
/// `model_suffix` is the last `/`-separated segment of `model_id`, lowercased.
/// An existing input is canonicalized, so `..` and symlinks are resolved; a
/// missing one is only made absolute.
pub fn resolve_output_path_on(input_file: &Path, model_id: &str, date: NaiveDate) -> PathBuf {
    let input_path = fs::canonicalize(input_file)
        .or_else(|_| std::path::absolute(input_file))
        .unwrap_or_else(|_| input_file.to_path_buf());
    let input_dir = input_path.parent().map(Path::to_path_buf).unwrap_or_default();
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    input_dir.join(format!(
        "{}-{}-{}.wav",
        date.format("%Y-%m-%d"),
        stem,
        model_suffix(model_id)
    ))
}

fn model_suffix(model_id: &str) -> String {
    model_id.rsplit('/').next().unwrap_or(model_id).to_lowercase()
}
