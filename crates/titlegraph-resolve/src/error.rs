//! Error types for the titlegraph-resolve crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Graph error: {0}")]
    Graph(#[from] titlegraph_core::TitleError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
