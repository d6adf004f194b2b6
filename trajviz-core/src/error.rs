//! Error types for trajviz-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the trajviz-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Base state record missing or unreadable
    #[error("base state {path}: {message}")]
    BaseState { path: PathBuf, message: String },

    /// Single event file unreadable
    #[error("event file {path}: {message}")]
    Event { path: PathBuf, message: String },

    /// Invalid glob pattern while discovering event files
    #[error("invalid event pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Result type alias for trajviz-core
pub type Result<T> = std::result::Result<T, Error>;
