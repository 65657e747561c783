use std::io;

#[derive(Debug, thiserror::Error)]
pub enum PbError {
    #[error("{0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{path}: {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Store(String),
}

impl PbError {
    /// Process exit code for this error: 1 for bad usage, 2 for an
    /// operation that failed underway.
    pub fn exit_code(&self) -> i32 {
        match self {
            PbError::Usage(_) => 1,
            _ => 2,
        }
    }
}

pub type Result<T> = std::result::Result<T, PbError>;
