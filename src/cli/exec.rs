use console::style;
use tracing::info;

use crate::cli::commands::ExecArgs;
use crate::errors::OllascanError;
use crate::models::Target;
use crate::scanner::{CommandGateway, GatewayCommand, OllamaProber, Probe};

/// Run one gateway command against a target. The target is probed first:
/// only hosts confirmed to expose the API without credentials are eligible
/// for management commands.
pub async fn handle_exec(args: ExecArgs) -> Result<(), OllascanError> {
    let command: GatewayCommand = args.command.parse()?;
    let target = Target::new(args.host.clone(), args.port);

    info!(target = %target, command = %args.command, "Probing target before command execution");
    let prober = OllamaProber::new(args.timeout)?;
    let probe = prober.probe(&target).await;
    if !probe.vulnerable {
        return Err(OllascanError::InvalidTarget(format!(
            "{target} is not a confirmed-vulnerable Ollama endpoint ({})",
            probe.error
        )));
    }

    let gateway = CommandGateway::new(args.timeout)?;
    let result = gateway
        .execute(
            &target.host,
            target.port,
            command,
            args.model.as_deref(),
            args.prompt.as_deref(),
        )
        .await;

    if result.success {
        let payload = result.data.unwrap_or_default();
        println!(
            "{}\n{}",
            style("OK").green().bold(),
            serde_json::to_string_pretty(&payload)?
        );
        Ok(())
    } else {
        let reason = result.error.unwrap_or_else(|| "unknown error".into());
        println!("{} {}", style("FAILED").red().bold(), reason);
        Err(OllascanError::Command(reason))
    }
}
