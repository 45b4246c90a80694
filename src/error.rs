use std::error::Error;
use std::fmt;

/// Errors surfaced by the annotation session and its collaborators.
///
/// `InvalidRange` and `StoreRejected` are shown to the user in a blocking
/// dialog; `LoadFailure` is only logged, since a failed structure load is
/// not something the user can act on from within the session.
#[derive(Debug)]
pub enum AnnotatorError {
    InvalidRange(String),
    StoreRejected(String),
    LoadFailure(String),
    Io(std::io::Error),
    Http(reqwest::Error),
    Serde(serde_json::Error),
}

impl fmt::Display for AnnotatorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnnotatorError::InvalidRange(msg) => write!(f, "invalid range: {msg}"),
            AnnotatorError::StoreRejected(detail) => write!(f, "{detail}"),
            AnnotatorError::LoadFailure(msg) => write!(f, "structure load failed: {msg}"),
            AnnotatorError::Io(err) => write!(f, "I/O error: {err}"),
            AnnotatorError::Http(err) => write!(f, "HTTP error: {err}"),
            AnnotatorError::Serde(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl Error for AnnotatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AnnotatorError::Io(err) => Some(err),
            AnnotatorError::Http(err) => Some(err),
            AnnotatorError::Serde(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AnnotatorError {
    fn from(err: std::io::Error) -> Self {
        AnnotatorError::Io(err)
    }
}

impl From<reqwest::Error> for AnnotatorError {
    fn from(err: reqwest::Error) -> Self {
        AnnotatorError::Http(err)
    }
}

impl From<serde_json::Error> for AnnotatorError {
    fn from(err: serde_json::Error) -> Self {
        AnnotatorError::Serde(err)
    }
}
