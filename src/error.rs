use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShutterError>;

#[derive(Error, Debug)]
pub enum ShutterError {
    #[error("failed to reach device")]
    Transport(#[from] reqwest::Error),
    #[error("device answered with status {0}")]
    HttpStatus(StatusCode),
    #[error("failed to parse device status payload")]
    InvalidStatusPayload(#[from] serde_json::Error),
    #[error("shutter {shutter} not selected after {presses} select presses")]
    SelectionExhausted { shutter: u8, presses: usize },
    #[error("configuration error")]
    Configuration(#[from] config::ConfigError),
}
