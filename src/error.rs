#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Entropy source failed: {0}")]
    Entropy(#[from] rand::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Worker {worker} panicked before returning its result")]
    WorkerPanicked { worker: usize },

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(std::io::Error),

    #[error("Failed to build async runtime: {0}")]
    Runtime(std::io::Error),
}

/// Errors raised while reading the total sample count from the console.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Invalid input: value must be a non-negative integer!")]
    NotAnInteger,

    #[error("Invalid input: value does not fit in 64 bits!")]
    OutOfRange,

    #[error("Invalid input: value must be a multiple of {unit}!")]
    NotAMultiple { unit: u64 },

    #[error("Input stream closed")]
    Closed,

    #[error("Console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
