use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("No definition for line {line_id:?}")]
    LineNotFound { line_id: String },

    #[error("Line {line_id:?} is malformed: {reason}")]
    Malformed { line_id: String, reason: String },

    #[error("Failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
