pub mod command_result;
pub mod scan_result;
pub mod target;

pub use command_result::CommandResult;
pub use scan_result::ScanResult;
pub use target::Target;

/// Per-scan parameters supplied by the caller; never global state.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Simultaneous in-flight probes, clamped to 1..=50.
    pub concurrency: usize,
    /// Connect and read timeout applied to every probe request.
    pub timeout_secs: u64,
}

impl ScanConfig {
    pub const MAX_CONCURRENCY: usize = 50;

    pub fn new(concurrency: usize, timeout_secs: u64) -> Self {
        Self {
            concurrency: concurrency.clamp(1, Self::MAX_CONCURRENCY),
            timeout_secs,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            timeout_secs: 5,
        }
    }
}
