//! Layered configuration: optional TOML file, then `VOXLINE__*` environment

use std::path::PathBuf;

use anyhow::Context;
use voxline_core::Config;

const CONFIG_PATH_VAR: &str = "VOXLINE_CONFIG";
const ENV_PREFIX: &str = "VOXLINE";

/// `VOXLINE_CONFIG`, or `<config dir>/voxline/config.toml`
pub fn config_path() -> Option<PathBuf> {
    std::env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join("voxline").join("config.toml")))
}

/// Load configuration. A missing file is fine; a malformed one is not.
///
/// Environment keys use `__` between sections, e.g.
/// `VOXLINE__PROVIDER__API_KEY` or `VOXLINE__TRANSCODER__TIMEOUT_SECS`.
pub fn load() -> anyhow::Result<Config> {
    let mut builder = config::Config::builder();

    if let Some(path) = config_path() {
        tracing::debug!("Reading configuration from {:?}", path);
        builder = builder.add_source(config::File::from(path).required(false));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to assemble configuration")?;

    settings
        .try_deserialize::<Config>()
        .context("Invalid configuration")
}
