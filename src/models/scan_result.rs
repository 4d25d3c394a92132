use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::target::Target;

/// The outcome of probing a single target. Exactly one of these is produced
/// per probe attempt, including attempts that failed internally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Host that was probed.
    pub host: String,
    /// Port that was probed.
    pub port: u16,
    /// True iff both the version and the tag-listing endpoint answered
    /// successfully without credentials.
    pub vulnerable: bool,
    /// Reported server version; empty when the probe never got that far.
    pub version: String,
    /// Model names exposed by the tag-listing endpoint, in response order.
    pub models: Vec<String>,
    /// Classified failure reason; empty on confirmed targets.
    pub error: String,
    /// Probe completion wall-clock time.
    pub timestamp: String,
}

impl ScanResult {
    fn now() -> String {
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// A target confirmed to expose its management API without credentials.
    pub fn confirmed(target: &Target, version: String, models: Vec<String>) -> Self {
        Self {
            host: target.host.clone(),
            port: target.port,
            vulnerable: true,
            version,
            models,
            error: String::new(),
            timestamp: Self::now(),
        }
    }

    /// A failed probe with a classified error reason.
    pub fn failed(target: &Target, error: impl Into<String>) -> Self {
        Self::failed_with_version(target, String::new(), error)
    }

    /// A failed probe where the version endpoint had already answered.
    pub fn failed_with_version(
        target: &Target,
        version: String,
        error: impl Into<String>,
    ) -> Self {
        Self {
            host: target.host.clone(),
            port: target.port,
            vulnerable: false,
            version,
            models: Vec::new(),
            error: error.into(),
            timestamp: Self::now(),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Flat field-name → value mapping consumed by the exporters. Field
    /// order here is the column order of exported files.
    pub fn as_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("host".into(), json!(self.host));
        record.insert("port".into(), json!(self.port));
        record.insert("url".into(), json!(self.url()));
        record.insert("vulnerable".into(), json!(self.vulnerable));
        record.insert("version".into(), json!(self.version));
        record.insert("models".into(), json!(self.models.join(", ")));
        record.insert("error".into(), json!(self.error));
        record.insert("timestamp".into(), json!(self.timestamp));
        record
    }
}
