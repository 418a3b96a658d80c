//! Transaction exports.
//!
//! Every format lists transactions in tick order with actor names in place of
//! ids. Removed actors still resolve, so older rows keep their names.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::model::Model;

/// Available export layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// `tick: [["A", "B"], ["C"]]` per line
    Txt,
    /// `tick,A;B,C` per line, one column per group
    CsvGroup,
    /// Object keyed by tick
    Json,
    /// `tick,A,B` per pair of actors sharing a group
    CsvActor,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Txt,
        ExportFormat::CsvGroup,
        ExportFormat::Json,
        ExportFormat::CsvActor,
    ];

    /// Name used in URLs and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::CsvGroup => "csv-group",
            ExportFormat::Json => "json",
            ExportFormat::CsvActor => "csv-actor",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::CsvGroup | ExportFormat::CsvActor => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::CsvGroup | ExportFormat::CsvActor => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    /// Timestamped file name, e.g. `2024-03-01T09-30-00Z.csv`.
    ///
    /// The time separators are dashes so the name is valid on every platform.
    pub fn filename(&self, now: DateTime<Utc>) -> String {
        format!("{}.{}", now.format("%Y-%m-%dT%H-%M-%SZ"), self.extension())
    }

    /// Render the model's transactions.
    pub fn render(&self, model: &Model) -> Result<String> {
        let rows: Vec<(u64, Vec<Vec<String>>)> = model
            .transactions()
            .iter()
            .map(|(tick, groups)| (tick, model.group_names(groups)))
            .collect();

        let text = match self {
            ExportFormat::Txt => rows
                .iter()
                .map(|(tick, names)| format!("{}: {:?}", tick, names))
                .collect::<Vec<_>>()
                .join("\n"),
            ExportFormat::CsvGroup => csv_text(rows.iter().map(|(tick, names)| {
                std::iter::once(tick.to_string())
                    .chain(names.iter().map(|group| group.join(";")))
                    .collect()
            }))?,
            ExportFormat::Json => {
                let object: serde_json::Map<String, serde_json::Value> = rows
                    .into_iter()
                    .map(|(tick, names)| serde_json::to_value(names).map(|v| (tick.to_string(), v)))
                    .collect::<std::result::Result<_, serde_json::Error>>()?;
                serde_json::to_string_pretty(&object)?
            }
            ExportFormat::CsvActor => csv_text(rows.iter().flat_map(|(tick, names)| {
                names.iter().flat_map(move |group| {
                    pairs(group).map(move |(a, b)| vec![tick.to_string(), a.to_string(), b.to_string()])
                })
            }))?,
        };

        Ok(text)
    }

    /// Render into a timestamped file under `dir`, returning its path.
    pub fn write_to(&self, dir: &Path, model: &Model, now: DateTime<Utc>) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.filename(now));
        fs::write(&path, self.render(model)?)?;
        info!(
            format = self.as_str(),
            path = %path.display(),
            at = %now.to_rfc3339_opts(SecondsFormat::Secs, true),
            "transactions exported"
        );
        Ok(path)
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| Error::UnknownExportFormat(s.to_string()))
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write records as CSV, quoting fields that need it.
fn csv_text<I>(records: I) -> Result<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(&record)?;
    }
    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Unordered pairs in listing order: (0,1), (0,2), ..., (1,2), ...
fn pairs(items: &[String]) -> impl Iterator<Item = (&str, &str)> {
    items.iter().enumerate().flat_map(move |(i, a)| {
        items[i + 1..].iter().map(move |b| (a.as_str(), b.as_str()))
    })
}
