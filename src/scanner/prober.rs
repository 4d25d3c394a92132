use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::net::TcpStream;
use tracing::debug;

use crate::errors::OllascanError;
use crate::models::{ScanResult, Target};

/// Probes one target for an unauthenticated Ollama management API.
///
/// Implementations are total: every probe attempt yields a `ScanResult`,
/// never an error — failures are classified into the result's `error` field
/// so one bad target cannot abort a batch.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &Target) -> ScanResult;
}

pub struct OllamaProber {
    client: Client,
    timeout: Duration,
}

impl OllamaProber {
    pub fn new(timeout_secs: u64) -> Result<Self, OllascanError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;
        Ok(Self { client, timeout })
    }

    /// Raw TCP liveness check, so dead hosts are classified distinctly from
    /// protocol-level failures and cost no HTTP round-trips.
    async fn port_open(&self, target: &Target) -> bool {
        let connect = TcpStream::connect((target.host.as_str(), target.port));
        matches!(tokio::time::timeout(self.timeout, connect).await, Ok(Ok(_)))
    }

    async fn probe_service(&self, target: &Target) -> Result<ScanResult, reqwest::Error> {
        let base = target.base_url();

        let response = self.client.get(format!("{base}/api/version")).send().await?;
        if !response.status().is_success() {
            return Ok(ScanResult::failed(target, "not the target service"));
        }
        let version = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("version").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| "Unknown".to_string());

        // The tag listing is the unauthorized-access check proper: a service
        // behind auth answers the version probe but rejects this one.
        let response = self.client.get(format!("{base}/api/tags")).send().await?;
        if !response.status().is_success() {
            let error = format!("API inaccessible (status {})", response.status().as_u16());
            return Ok(ScanResult::failed_with_version(target, version, error));
        }

        let models = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| {
                body.get("models").and_then(Value::as_array).map(|models| {
                    models
                        .iter()
                        .filter_map(|m| m.get("name").and_then(Value::as_str))
                        .map(String::from)
                        .collect()
                })
            })
            .unwrap_or_default();

        Ok(ScanResult::confirmed(target, version, models))
    }
}

#[async_trait]
impl Probe for OllamaProber {
    async fn probe(&self, target: &Target) -> ScanResult {
        if !self.port_open(target).await {
            debug!(target = %target, "Port closed or unreachable");
            return ScanResult::failed(target, "port closed/unreachable");
        }

        match self.probe_service(target).await {
            Ok(result) => result,
            Err(e) => ScanResult::failed(target, classify_transport_error(&e)),
        }
    }
}

fn classify_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "connection timeout".to_string()
    } else if error.is_connect() {
        "connection failed".to_string()
    } else {
        format!("scan exception: {error}")
    }
}
