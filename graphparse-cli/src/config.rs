use crate::cli::Cli;
use crate::error::{CliError, CliResult};
use graphparse::ParserConfig;
use std::fs;
use std::path::Path;

/// Read a TOML parser config; missing fields keep their defaults.
pub fn load(path: Option<&Path>) -> CliResult<ParserConfig> {
    let Some(path) = path else {
        return Ok(ParserConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::Config(format!("failed to read {}: {e}", path.display())))?;
    Ok(toml::from_str(&text)?)
}

/// Config file values with command line flags applied on top.
pub fn resolve(cli: &Cli) -> CliResult<ParserConfig> {
    let mut config = load(cli.config.as_deref())?;
    if cli.no_provenance {
        config.record_provenance = false;
    }
    Ok(config)
}
