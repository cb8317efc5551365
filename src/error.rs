use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The capture source could not be opened or read at all. This is the
    /// single unrecoverable failure of the engine; everything else degrades
    /// per-frame or per-section.
    #[error("capture source unreadable: {0}")]
    SourceUnreadable(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
