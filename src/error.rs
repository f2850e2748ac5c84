//! Failures a tool run can hit. Each one is journaled and ends the run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to read file {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Warning: the file {0} is empty")]
    EmptyInput(PathBuf),

    #[error("No readable source files found under {0}")]
    NoSources(PathBuf),

    #[error("Task is not a code generation request; I am a code generator only")]
    Refused,

    #[error("Model call to {backend} failed: {source:#}")]
    Endpoint {
        backend: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Failed to save {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;
