//! Flat snapshot files: a JSON array of post records, or plain text with one
//! post per line.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::info;

use crate::error::{Result, TagnetError};

static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w]+").unwrap());

/// Contents of an input file, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum InputFile {
    /// JSON array of structured records.
    Snapshot(Vec<Value>),
    /// Raw text, one message per non-blank line.
    Lines(Vec<String>),
}

impl InputFile {
    pub fn len(&self) -> usize {
        match self {
            InputFile::Snapshot(records) => records.len(),
            InputFile::Lines(lines) => lines.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load an input file. A `.json` file must parse as a snapshot. Any other
/// file is a snapshot only if it parses as a top-level JSON array, and is
/// read as raw lines otherwise.
pub fn load_input(path: &Path) -> Result<InputFile> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let records = if is_json {
        Some(parse_snapshot(&content)?)
    } else if content.trim_start().starts_with('[') {
        parse_snapshot(&content).ok()
    } else {
        None
    };

    match records {
        Some(records) => {
            info!(path = %path.display(), records = records.len(), "Loaded snapshot");
            Ok(InputFile::Snapshot(records))
        }
        None => {
            let lines = split_lines(&content);
            info!(path = %path.display(), lines = lines.len(), "Loaded raw text");
            Ok(InputFile::Lines(lines))
        }
    }
}

/// Load a snapshot file. Individual records are left undecoded so that one
/// bad record only costs that record.
pub fn load_snapshot(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    parse_snapshot(&content)
}

/// Parse snapshot text. Anything but a top-level array is a batch failure.
pub fn parse_snapshot(content: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(records) => Ok(records),
        other => Err(TagnetError::Snapshot(format!(
            "expected a JSON array of records, found {}",
            value_kind(&other)
        ))),
    }
}

/// Write records as a JSON array.
pub fn save_snapshot(path: &Path, records: &[Value]) -> Result<()> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, records)?;
    writer.flush()?;
    info!(path = %path.display(), records = records.len(), "Saved snapshot");
    Ok(())
}

/// Default file name for a fetched snapshot: `<track>-<count>.json`, or
/// `stream-<count>.json` when the track keyword has no word characters.
pub fn default_snapshot_name(track: &str, count: usize) -> String {
    let cleaned = sanitize_track(track);
    if cleaned.is_empty() {
        format!("stream-{count}.json")
    } else {
        format!("{cleaned}-{count}.json")
    }
}

/// Strip everything but word characters from a track keyword (`#cats,@dogs` → `catsdogs`).
pub fn sanitize_track(track: &str) -> String {
    NON_WORD_RE.replace_all(track, "").into_owned()
}

fn split_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
