use anyhow::{Context, Result};
use consensus::Hash;
use dagview::{cli, config, report, ui};
use std::process;
use tracing::error;

fn main() {
    // Parse command line arguments
    let args = cli::parse_args();

    // Initialize logging
    init_logging(&args);

    if let Err(e) = execute(&args) {
        ui::print_status("✗", &format!("{:#}", e), ui::StatusType::Error);
        error!("dagview failed: {:#}", e);
        process::exit(1);
    }
}

fn execute(args: &cli::Args) -> Result<()> {
    let config = config::resolve(args).context("Invalid configuration")?;
    let confirmations_of = args
        .confirmations
        .as_deref()
        .map(|text| text.parse::<Hash>().with_context(|| format!("Invalid block hash {}", text)))
        .transpose()?;

    let blocks = report::load_blocks(&args.blocks)?;
    let report = report::run(config, blocks, confirmations_of)?;

    let json = if args.pretty { serde_json::to_string_pretty(&report)? } else { serde_json::to_string(&report)? };
    println!("{}", json);

    if !report.rejected.is_empty() || !report.pending.is_empty() {
        ui::print_status(
            "!",
            &format!("{} rejected, {} still pending", report.rejected.len(), report.pending.len()),
            ui::StatusType::Warning,
        );
    } else {
        ui::print_status("✓", &format!("{} blocks colored", report.blocks.len()), ui::StatusType::Success);
    }
    Ok(())
}

fn init_logging(args: &cli::Args) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}
