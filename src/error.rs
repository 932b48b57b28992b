use thiserror::Error;

// Errors raised by the classification engine itself.

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unknown product type: {0}")]
    UnknownProductType(String),
    #[error("malformed perception payload: {0}")]
    MalformedPerception(#[from] serde_json::Error),
    #[error("invalid color value: {0}")]
    InvalidColor(String),
}

// Application-level error type for the binary and async layers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Engine Error: {0}")]
    Engine(#[from] EngineError),
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Perception provider failed for '{0}': {1}")]
    Provider(String, String),
    #[error("Result sink failed: {0}")]
    Sink(String),
    #[error("The coordinator queue is closed.")]
    QueueClosed,
}
