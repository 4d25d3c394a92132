use std::path::Path;
use std::sync::Arc;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::commands::ScanArgs;
use crate::errors::OllascanError;
use crate::export::{self, ExportFormat};
use crate::models::{ScanConfig, Target};
use crate::resolver;
use crate::scanner::{OllamaProber, ScanOrchestrator};

pub async fn handle_scan(args: ScanArgs) -> Result<(), OllascanError> {
    let targets = resolve_targets(&args)?;
    if targets.is_empty() {
        warn!("No targets resolved from the given input");
        println!("{}", style("Nothing to scan.").yellow());
        return Ok(());
    }

    let config = ScanConfig::new(args.concurrency, args.timeout);
    info!(
        targets = targets.len(),
        concurrency = config.concurrency,
        timeout_secs = config.timeout_secs,
        "Starting scan"
    );

    let prober = Arc::new(OllamaProber::new(config.timeout_secs)?);
    let orchestrator = ScanOrchestrator::new(prober);

    // Ctrl-C trips the token; the orchestrator winds down cooperatively.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let bar = ProgressBar::new(targets.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:30.cyan/dark_gray} {pos}/{len} targets | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let mut vulnerable_count = 0usize;
    let results = orchestrator
        .scan_batch(&targets, &config, cancel.clone(), |result, completed, _total| {
            if result.vulnerable {
                vulnerable_count += 1;
                bar.println(format!(
                    "{} {} (version {}, {} models: {})",
                    style("VULNERABLE").red().bold(),
                    result.url(),
                    result.version,
                    result.models.len(),
                    result.models.join(", "),
                ));
            }
            bar.set_position(completed as u64);
            bar.set_message(format!("{vulnerable_count} vulnerable"));
        })
        .await;
    bar.finish_and_clear();

    if cancel.is_cancelled() {
        println!("{}", style("Scan cancelled.").yellow());
    }
    println!(
        "Scanned {} of {} targets, {} vulnerable.",
        results.len(),
        targets.len(),
        style(vulnerable_count).red().bold(),
    );

    if let Some(output) = &args.output {
        let format: ExportFormat = args.format.parse()?;
        let filtered = export::filter_results(&results, 0, None, args.vulnerable_only);
        if filtered.is_empty() {
            println!("{}", style("No results matched the export filter.").yellow());
        } else {
            let written = export::export_results(&filtered, Path::new(output), format)?;
            println!("Results written to {}", written.display());
        }
    }

    Ok(())
}

fn resolve_targets(args: &ScanArgs) -> Result<Vec<Target>, OllascanError> {
    match (&args.range, &args.file) {
        (Some(range), None) => Ok(resolver::resolve_range(range, args.port)),
        (None, Some(file)) => resolver::resolve_file(file),
        _ => Err(OllascanError::Config(
            "exactly one of --range or --file is required".into(),
        )),
    }
}
