use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;
use tracing::info;

use crate::errors::OllascanError;
use crate::models::ScanResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = OllascanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(OllascanError::Export(format!(
                "Unsupported export format: {other}"
            ))),
        }
    }
}

/// Write results as a flat file in the requested format. Parent directories
/// are created and the format's extension appended when missing.
pub fn export_results(
    results: &[ScanResult],
    path: impl AsRef<Path>,
    format: ExportFormat,
) -> Result<PathBuf, OllascanError> {
    if results.is_empty() {
        return Err(OllascanError::Export("no results to export".into()));
    }

    let path = with_extension(path.as_ref(), format.extension());
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match format {
        ExportFormat::Csv => export_csv(results, &path)?,
        ExportFormat::Json => export_json(results, &path)?,
    }

    info!(path = %path.display(), count = results.len(), "Exported scan results");
    Ok(path)
}

fn with_extension(path: &Path, extension: &str) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(e) if e.eq_ignore_ascii_case(extension) => path.to_path_buf(),
        _ => PathBuf::from(format!("{}.{}", path.display(), extension)),
    }
}

fn export_csv(results: &[ScanResult], path: &Path) -> Result<(), OllascanError> {
    let mut file = std::fs::File::create(path)?;
    // Excel only detects UTF-8 when the file carries a BOM.
    file.write_all(b"\xEF\xBB\xBF")?;

    let mut writer = csv::Writer::from_writer(file);
    let header: Vec<String> = results[0].as_record().keys().cloned().collect();
    writer.write_record(&header)?;

    for result in results {
        let row: Vec<String> = result
            .as_record()
            .values()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn export_json(results: &[ScanResult], path: &Path) -> Result<(), OllascanError> {
    let records: Vec<Value> = results.iter().map(|r| Value::Object(r.as_record())).collect();
    let json = serde_json::to_string_pretty(&records)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Slice and filter results ahead of export.
pub fn filter_results(
    results: &[ScanResult],
    start: usize,
    count: Option<usize>,
    vulnerable_only: bool,
) -> Vec<ScanResult> {
    let filtered: Vec<&ScanResult> = results
        .iter()
        .filter(|r| !vulnerable_only || r.vulnerable)
        .collect();

    let end = match count {
        Some(count) => (start + count).min(filtered.len()),
        None => filtered.len(),
    };
    if start >= filtered.len() {
        return Vec::new();
    }

    filtered[start..end].iter().map(|r| (*r).clone()).collect()
}
