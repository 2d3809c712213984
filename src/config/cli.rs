use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "pdf-translator")]
#[command(about = "Translate PDF documents with DeepL while watching the connection")]
pub struct CliArgs {
    #[arg(long, help = "Path to a TOML configuration file (default: ./translator.toml)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Write logs as JSON lines")]
    pub json_logs: bool,
}
