use consensus_core::{ConfigError, DagConfig, IngestionMode};

use crate::cli::Args;

/// Builds the engine config: network preset first, then the config file,
/// then defaults. CLI flags are applied on top.
pub fn resolve(args: &Args) -> Result<DagConfig, ConfigError> {
    let mut config = if let Some(network) = &args.network {
        DagConfig::for_network(network)?
    } else if let Some(config_path) = &args.config_path {
        DagConfig::load(config_path)?
    } else {
        DagConfig::default()
    };

    apply_cli_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

/// Override config with CLI arguments
pub fn apply_cli_overrides(config: &mut DagConfig, args: &Args) {
    if let Some(k) = args.k {
        config.ghostdag_k = k;
    }

    if args.strict {
        config.ingestion_mode = IngestionMode::Strict;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["dagview", "--blocks", "blocks.json"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = resolve(&args(&[])).unwrap();
        assert_eq!(config, DagConfig::default());
    }

    #[test]
    fn test_network_preset_with_overrides() {
        let config = resolve(&args(&["--network", "devnet", "--k", "5", "--strict"])).unwrap();
        assert_eq!(config.network, "devnet");
        assert_eq!(config.ghostdag_k, 5);
        assert_eq!(config.ingestion_mode, IngestionMode::Strict);
    }

    #[test]
    fn test_unknown_network() {
        assert!(matches!(resolve(&args(&["--network", "moonnet"])), Err(ConfigError::UnknownNetwork(_))));
    }

    #[test]
    fn test_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ghostdag_k = 7\nmax_orphans = 3").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = resolve(&args(&["--config", &path])).unwrap();
        assert_eq!(config.ghostdag_k, 7);
        assert_eq!(config.max_orphans, 3);
    }
}
