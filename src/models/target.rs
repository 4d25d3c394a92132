use std::fmt;

use serde::{Deserialize, Serialize};

/// One (host, port) pair to probe. Host is a hostname or IPv4 literal,
/// never a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    /// Ollama's well-known management port, used whenever an input source
    /// does not specify one.
    pub const DEFAULT_PORT: u16 = 11434;

    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Base URL of the management API on this target.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
