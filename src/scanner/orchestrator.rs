use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::models::{ScanConfig, ScanResult, Target};

use super::prober::Probe;

/// Dispatches probes across a target list under a bounded concurrency
/// limit, delivering results to a callback in completion order.
pub struct ScanOrchestrator {
    prober: Arc<dyn Probe>,
}

impl ScanOrchestrator {
    pub fn new(prober: Arc<dyn Probe>) -> Self {
        Self { prober }
    }

    /// Probe every target with at most `config.concurrency` probes in
    /// flight. `on_result` is invoked exactly once per delivered result
    /// with `(result, completed, total)`, where `completed` counts 1-based
    /// across the whole batch.
    ///
    /// Cancellation is cooperative: once `cancel` trips, no new probes are
    /// started and no further callbacks are delivered; probes already in
    /// flight are abandoned and their completions discarded. Returning is
    /// the "scan finished" signal, whether the batch ran out or was
    /// cancelled.
    pub async fn scan_batch<F>(
        &self,
        targets: &[Target],
        config: &ScanConfig,
        cancel: CancellationToken,
        mut on_result: F,
    ) -> Vec<ScanResult>
    where
        F: FnMut(&ScanResult, usize, usize),
    {
        let total = targets.len();
        let concurrency = config.concurrency.clamp(1, ScanConfig::MAX_CONCURRENCY);
        info!(total, concurrency, "Starting scan batch");

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let (tx, mut rx) = mpsc::unbounded_channel::<ScanResult>();

        for target in targets.iter().cloned() {
            let semaphore = semaphore.clone();
            let prober = self.prober.clone();
            let cancel = cancel.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                if cancel.is_cancelled() {
                    return;
                }
                // Receiver may be gone after cancellation; the completion
                // is intentionally dropped then.
                let _ = tx.send(prober.probe(&target).await);
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(total);
        let mut completed = 0usize;
        while let Some(result) = rx.recv().await {
            if cancel.is_cancelled() {
                debug!(completed, total, "Scan cancelled, discarding remaining completions");
                break;
            }
            completed += 1;
            on_result(&result, completed, total);
            results.push(result);
        }

        info!(completed, total, "Scan batch finished");
        results
    }
}
