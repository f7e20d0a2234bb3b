use thiserror::Error;
use tiling_core::TilingError;

/// Application-level errors wrapping the engine and IO layers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine Error: {0}")]
    Engine(#[from] TilingError),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
}
