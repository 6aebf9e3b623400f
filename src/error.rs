//! Error types for DishaNav

use crate::graph::NodeId;
use thiserror::Error;

/// DishaNav error type
#[derive(Error, Debug)]
pub enum NavError {
    /// A sensor update carried the wrong number of readings.
    /// The update is rejected and detector state is left unchanged.
    #[error("sensor reading count mismatch: expected {expected}, got {actual}")]
    SensorCountMismatch { expected: usize, actual: usize },

    /// An explicit connection referenced a node id that does not exist.
    #[error("unknown node id {0}")]
    UnknownNode(NodeId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for NavError {
    fn from(e: toml::de::Error) -> Self {
        NavError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
