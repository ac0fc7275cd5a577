use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReqtrackError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Illegal transition for {id}: {from} -> {to}")]
    IllegalTransition {
        id: String,
        from: String,
        to: String,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error("Seed error: {0}")]
    SeedError(String),
}
