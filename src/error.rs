use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the I/O collaborators around the pick pipeline.
///
/// The pipeline itself never fails; malformed input only degrades.
#[derive(Debug)]
pub enum Error {
    /// The thread could not be fetched.
    Http(reqwest::Error),
    Io(std::io::Error),
    /// A stored snapshot exists but is not valid JSON.
    CorruptSnapshot {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// A freshly fetched payload is not valid JSON and was not stored.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "fetching thread failed: {}", e),
            Error::Io(e) => write!(f, "i/o error: {}", e),
            Error::CorruptSnapshot { path, source } => {
                write!(f, "unable to read snapshot {}: {}", path.display(), source)
            }
            Error::InvalidPayload(e) => write!(f, "fetched payload is not valid JSON: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::CorruptSnapshot { source, .. } => Some(source),
            Error::InvalidPayload(e) => Some(e),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
