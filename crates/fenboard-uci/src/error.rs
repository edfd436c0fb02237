use std::time::Duration;
use thiserror::Error;

/// Failures talking to an external UCI engine
///
/// Every variant means the engine can no longer be trusted for this session;
/// callers disable engine features rather than retry.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to start engine {path:?}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Engine handshake failed: expected {expected}")]
    Handshake { expected: &'static str },

    #[error("Engine did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Engine process closed its output")]
    Disconnected,

    #[error("Engine returned no move for {fen:?}")]
    NoBestMove { fen: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
