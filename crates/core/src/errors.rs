use std::path::PathBuf;

use thiserror::Error;

/// Failures reaching or understanding the quotation store.
///
/// A record the store does not have is not an error; store operations return
/// `Ok(None)` for that.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store request to `{path}` failed: {message}")]
    Transport { path: String, message: String },
    #[error("store returned HTTP {status} for `{path}`")]
    Status { path: String, status: u16 },
    #[error("store response from `{path}` could not be decoded: {message}")]
    Decode { path: String, message: String },
}

impl StoreError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Transport { .. } => {
                "The quotation store could not be reached. Please retry shortly."
            }
            Self::Status { .. } => "The quotation store rejected the request.",
            Self::Decode { .. } => "The quotation store sent a response that could not be read.",
        }
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("template error: {0}")]
    Template(String),
    #[error("conversion error: {0}")]
    Conversion(String),
    #[error("policy has no number; only stored policies get certificates")]
    MissingPolicyNumber,
    #[error("cannot write `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("terminal input closed")]
    InputClosed,
    #[error("choice {index} is outside the {options} offered options")]
    InvalidChoice { index: usize, options: usize },
    #[error("value {value} was not accepted: {reason}")]
    RejectedValue { value: i64, reason: String },
    #[error("terminal IO failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Conditions that end an interactive session. Store and document failures
/// are recovered inside the workflow and never surface here.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Presentation(#[from] PresentationError),
}
