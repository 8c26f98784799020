use thiserror::Error;

/// Errors surfaced by the log pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// The endpoint could not open a log stream for the container
    #[error("failed to open log stream for {container_id}: {source}")]
    StreamOpen {
        container_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The context was already cleaned up and cannot stream again
    #[error("log context for {container_id} is closed")]
    ContextClosed { container_id: String },

    /// Log tasks need a running tokio runtime
    #[error("no async runtime to stream logs for {container_id}")]
    NoRuntime { container_id: String },

    /// A container context failed to initialize during a bulk initialization
    #[error("failed to initialize context for {name}: {source}")]
    ContextInit {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid search pattern: {0}")]
    Search(#[from] regex::Error),

    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
