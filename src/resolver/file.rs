use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::OllascanError;
use crate::models::Target;

/// Header names that mark a column or field as holding the host address.
/// Matched case-insensitively as substrings; the CJK aliases cover exports
/// from Chinese asset-search engines.
const HOST_ALIASES: &[&str] = &[
    "ip", "host", "domain", "address", "target", "域名", "地址", "目标",
];
const PORT_ALIASES: &[&str] = &["port", "端口"];

/// JSON record keys checked, in order, for the host value.
const HOST_KEYS: &[&str] = &["ip", "host", "domain"];

/// Parse a target-list file, dispatching on its extension. Only `.csv` and
/// `.json` are supported. Malformed rows/records are skipped; an unreadable
/// or syntactically invalid file fails the whole operation.
pub fn resolve_file(path: impl AsRef<Path>) -> Result<Vec<Target>, OllascanError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let targets = match extension.as_str() {
        "csv" => parse_csv(path)?,
        "json" => parse_json(path)?,
        other => {
            return Err(OllascanError::UnsupportedFormat(format!(
                "{} (only CSV and JSON are supported)",
                if other.is_empty() { "<none>" } else { other }
            )))
        }
    };

    info!(path = %path.display(), count = targets.len(), "Resolved target file");
    Ok(targets)
}

fn parse_csv(path: &Path) -> Result<Vec<Target>, OllascanError> {
    let content = read_with_fallback(path)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let header_map: HashMap<usize, String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (i, h.to_lowercase()))
        .collect();

    let host_col = find_column(&header_map, HOST_ALIASES);
    let port_col = find_column(&header_map, PORT_ALIASES);

    let Some(host_col) = host_col else {
        warn!(path = %path.display(), "No host column detected in CSV header");
        return Ok(Vec::new());
    };
    debug!(host_col, ?port_col, "Detected CSV columns");

    let mut targets = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                warn!(line = line + 2, error = %e, "Skipping malformed CSV row");
                continue;
            }
        };

        let raw = record.get(host_col).unwrap_or("").trim();
        let mut host = clean_host(raw);

        let mut port = port_col
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok())
            .unwrap_or(Target::DEFAULT_PORT);

        // host:port embedded in the address cell overrides the port column
        if let Some((h, p)) = host.split_once(':') {
            if let Ok(p) = p.parse() {
                port = p;
            }
            host = h.to_string();
        }

        if host.is_empty() {
            continue;
        }
        targets.push(Target::new(host, port));
    }

    Ok(targets)
}

/// Heuristic column autodetection: first header containing any alias wins.
/// Best-effort — a column named e.g. "ip_notes" also matches.
fn find_column(header_map: &HashMap<usize, String>, aliases: &[&str]) -> Option<usize> {
    let mut indices: Vec<&usize> = header_map.keys().collect();
    indices.sort();
    for &i in indices {
        let header = &header_map[&i];
        if aliases.iter().any(|a| header.contains(a)) {
            return Some(i);
        }
    }
    None
}

/// Read a text file as UTF-8, retrying as GBK before giving up. Exports
/// produced on Chinese-locale Windows commonly arrive GBK-encoded.
fn read_with_fallback(path: &Path) -> Result<String, OllascanError> {
    let bytes = std::fs::read(path)?;
    if let Ok(text) = std::str::from_utf8(&bytes) {
        return Ok(text.to_string());
    }

    let (decoded, _, had_errors) = encoding_rs::GBK.decode(&bytes);
    if had_errors {
        return Err(OllascanError::Parse(format!(
            "{} is neither valid UTF-8 nor GBK",
            path.display()
        )));
    }
    debug!(path = %path.display(), "Decoded file as GBK after UTF-8 failure");
    Ok(decoded.into_owned())
}

fn parse_json(path: &Path) -> Result<Vec<Target>, OllascanError> {
    let content = std::fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&content)?;

    // Canonical shape: {"results": [{"ip": ..., "port": ...}, ...]}
    if let Some(results) = document.get("results").and_then(Value::as_array) {
        let targets = results
            .iter()
            .filter_map(Value::as_object)
            .filter_map(target_from_record)
            .collect();
        return Ok(targets);
    }

    // Upstream producers nest records at arbitrary depths; fall back to a
    // full walk treating any object with a host-alias key as a record.
    let mut targets = Vec::new();
    walk(&document, &mut targets);
    Ok(targets)
}

fn walk(value: &Value, targets: &mut Vec<Target>) {
    match value {
        Value::Object(map) => {
            if HOST_KEYS.iter().any(|k| map.contains_key(*k)) {
                if let Some(target) = target_from_record(map) {
                    targets.push(target);
                }
            } else {
                for v in map.values() {
                    walk(v, targets);
                }
            }
        }
        Value::Array(items) => {
            for v in items {
                walk(v, targets);
            }
        }
        _ => {}
    }
}

fn target_from_record(record: &serde_json::Map<String, Value>) -> Option<Target> {
    let raw = HOST_KEYS.iter().find_map(|k| record.get(*k)).map(|v| match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })?;

    let host = clean_host(&raw);
    if host.is_empty() {
        return None;
    }

    let port = record
        .get("port")
        .and_then(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .and_then(|p| u16::try_from(p).ok())
        .unwrap_or(Target::DEFAULT_PORT);

    Some(Target::new(host, port))
}

/// Strip a leading scheme and truncate at the first `/`, leaving bare
/// `host` or `host:port`.
fn clean_host(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("http://")
        .or_else(|| raw.strip_prefix("https://"))
        .unwrap_or(raw);
    match raw.split_once('/') {
        Some((host, _)) => host.to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_host_strips_scheme_and_path() {
        assert_eq!(clean_host("http://1.2.3.4:9999/x"), "1.2.3.4:9999");
        assert_eq!(clean_host("https://example.com/api/tags"), "example.com");
        assert_eq!(clean_host("  example.com  "), "example.com");
        assert_eq!(clean_host("http://"), "");
    }

    #[test]
    fn record_extraction_prefers_ip_key() {
        let record = serde_json::json!({
            "ip": "10.0.0.1",
            "host": "ignored.example.com",
            "port": 8080
        });
        let target = target_from_record(record.as_object().unwrap()).unwrap();
        assert_eq!(target, Target::new("10.0.0.1", 8080));
    }

    #[test]
    fn record_extraction_handles_string_port_and_default() {
        let record = serde_json::json!({"host": "a.example.com", "port": "9000"});
        let target = target_from_record(record.as_object().unwrap()).unwrap();
        assert_eq!(target.port, 9000);

        let record = serde_json::json!({"host": "b.example.com"});
        let target = target_from_record(record.as_object().unwrap()).unwrap();
        assert_eq!(target.port, Target::DEFAULT_PORT);
    }

    #[test]
    fn record_with_empty_host_is_dropped() {
        let record = serde_json::json!({"ip": "http://", "port": 80});
        assert!(target_from_record(record.as_object().unwrap()).is_none());
    }
}
