//! # Annotation Export Model
//!
//! Serde model of the annotation tool's export: a JSON array of tasks, each
//! with its source `data` and a list of completions holding labeled
//! character spans. Exports arrive either as a zip archive with a
//! `result.json` entry or as the bare JSON file.

use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::types::EntitySpan;

/// Archive entry holding the export.
pub const RESULT_ENTRY: &str = "result.json";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// One exported task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Newer exports call these `annotations`.
    #[serde(default, alias = "annotations")]
    pub completions: Vec<Completion>,
}

impl ExportTask {
    /// Source text stored under `key`, if it is a string.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Identifier as a string: the exported `id` when present, else `fallback`.
    pub fn id_or(&self, fallback: usize) -> String {
        match &self.id {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// One annotator's submission for a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub was_cancelled: Option<bool>,
    #[serde(default)]
    pub result: Vec<ResultItem>,
}

impl Completion {
    pub fn is_cancelled(&self) -> bool {
        self.was_cancelled == Some(true)
    }

    /// Labeled spans in this completion, plus the number of result items
    /// that could not be read as a span (missing or negative offsets, no label).
    pub fn spans(&self) -> (Vec<EntitySpan>, usize) {
        let mut spans = Vec::with_capacity(self.result.len());
        let mut invalid = 0;
        for item in &self.result {
            match item.value.to_span() {
                Some(span) => spans.push(span),
                None => {
                    debug!(value = ?item.value, "unreadable result item");
                    invalid += 1;
                }
            }
        }
        (spans, invalid)
    }
}

/// A single labeled region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: ResultValue,
}

/// Offsets are signed so malformed negative values parse and can be counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultValue {
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ResultValue {
    /// The first label over `[start, end)`, when both offsets are non-negative.
    pub fn to_span(&self) -> Option<EntitySpan> {
        let start = usize::try_from(self.start?).ok()?;
        let end = usize::try_from(self.end?).ok()?;
        let label = self.labels.first()?;
        Some(EntitySpan::new(start, end, label.clone()))
    }
}

/// Parse the export JSON.
pub fn parse_export(json: &str) -> Result<Vec<ExportTask>> {
    Ok(serde_json::from_str(json)?)
}

/// Read the export out of a zip archive.
///
/// # Errors
///
/// `Archive` if the zip is unreadable, `MissingArchiveEntry` if it has no
/// `result.json` (at the root or in a single sub-directory), `Json` if the
/// entry is malformed.
pub fn read_archive<R: Read + Seek>(reader: R) -> Result<Vec<ExportTask>> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let name = if archive.file_names().any(|n| n == RESULT_ENTRY) {
        RESULT_ENTRY.to_string()
    } else {
        archive
            .file_names()
            .find(|n| n.ends_with(&format!("/{RESULT_ENTRY}")))
            .map(str::to_string)
            .ok_or_else(|| CoreError::MissingArchiveEntry {
                name: RESULT_ENTRY.to_string(),
            })?
    };

    let mut json = String::new();
    archive.by_name(&name)?.read_to_string(&mut json)?;
    parse_export(&json)
}

/// Load an export from disk, zip or bare JSON (detected by content).
pub fn load_export(path: impl AsRef<Path>) -> Result<Vec<ExportTask>> {
    let bytes = fs::read(path.as_ref())?;
    if bytes.starts_with(ZIP_MAGIC) {
        read_archive(Cursor::new(bytes))
    } else {
        Ok(serde_json::from_slice(&bytes)?)
    }
}
