use crate::error::Result;
use secrecy::Secret;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::*;

const DEFAULT_DEVICE_PORT: u16 = 80;
const ENVIRONMENT_PREFIX: &str = "SHUTTER";

/// Defaults, then the optional file, then `SHUTTER__*` environment variables
pub fn get_configuration(config: Option<PathBuf>) -> Result<AppConfig> {
    let mut builder =
        config::Config::builder().set_default("device_port", i64::from(DEFAULT_DEVICE_PORT))?;

    if let Some(config) = config {
        info!("Using configuration from {:?}", config);
        builder = builder.add_source(config::File::from(config));
    } else {
        debug!("Using default configuration");
    }

    let settings = builder
        .add_source(config::Environment::with_prefix(ENVIRONMENT_PREFIX).separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub device_port: u16,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

/// Web admin login of the device
#[derive(Deserialize, Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: Secret<String>,
}
