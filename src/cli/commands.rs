use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ollascan", version, about = "Ollama unauthorized access scanner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan targets for an unauthenticated Ollama API
    Scan(ScanArgs),
    /// Run a management command against a confirmed target
    Exec(ExecArgs),
}

#[derive(Args, Clone)]
pub struct ScanArgs {
    /// IP range expression: CIDR, dash range, or a single address
    #[arg(short, long, conflicts_with = "file")]
    pub range: Option<String>,

    /// Target list file (.csv or .json)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Port used for IP-range targets
    #[arg(short, long, default_value = "11434")]
    pub port: u16,

    /// Simultaneous probes (1-50)
    #[arg(short, long, default_value = "10")]
    pub concurrency: usize,

    /// Connect/read timeout per probe, in seconds
    #[arg(short, long, default_value = "5")]
    pub timeout: u64,

    /// Export results to this path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Export format: csv, json
    #[arg(long, default_value = "csv")]
    pub format: String,

    /// Export only confirmed-vulnerable results
    #[arg(long)]
    pub vulnerable_only: bool,
}

#[derive(Args, Clone)]
pub struct ExecArgs {
    /// Target host
    #[arg(long)]
    pub host: String,

    /// Target port
    #[arg(short, long, default_value = "11434")]
    pub port: u16,

    /// Command: list, version, ps, show, pull, rm, chat
    #[arg(short, long)]
    pub command: String,

    /// Model name (required by show, pull, rm, chat)
    #[arg(short, long)]
    pub model: Option<String>,

    /// User message for the chat command
    #[arg(long)]
    pub prompt: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "5")]
    pub timeout: u64,
}
