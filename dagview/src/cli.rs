use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dagview")]
#[command(about = "Colors a Phoenix blockDAG dump and prints the visualization report", long_about = None)]
pub struct Args {
    /// JSON array of blocks, ingested in file order
    #[arg(short, long)]
    pub blocks: PathBuf,

    /// Path to configuration file (optional, uses defaults if not provided)
    #[arg(short, long = "config")]
    pub config_path: Option<PathBuf>,

    /// Network preset (mainnet, testnet, devnet)
    #[arg(short, long)]
    pub network: Option<String>,

    /// GHOSTDAG K override
    #[arg(short, long)]
    pub k: Option<u16>,

    /// Reject blocks whose parents are unknown instead of holding them
    #[arg(long)]
    pub strict: bool,

    /// Also report confirmations of this block hash
    #[arg(long)]
    pub confirmations: Option<String>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,
}

pub fn parse_args() -> Args {
    Args::parse()
}
