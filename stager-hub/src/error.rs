//! Error types for hub operations

use reqwest::StatusCode;
use thiserror::Error;

/// Result type for hub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the hub
#[derive(Error, Debug)]
pub enum Error {
    /// Transport or decoding failure
    #[error("Hub request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Unexpected response status
    #[error("Hub returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    /// Invalid hub URL or path
    #[error("Invalid hub URL: {0}")]
    Url(#[from] url::ParseError),

    /// Local file error while downloading
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration or credentials unusable
    #[error("Hub configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the hub reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// Core error for a failed file or bucket download
    pub fn into_download_error(self) -> stager_core::Error {
        match self {
            Error::Io(e) => stager_core::Error::Io(e),
            other => stager_core::Error::Other(format!("Download failed: {}", other)),
        }
    }
}

impl From<Error> for stager_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => stager_core::Error::Io(e),
            other => stager_core::Error::AuthResolution(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = Error::Status {
            status: StatusCode::NOT_FOUND,
            url: "http://hub/identities/9".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!Error::Config("x".to_string()).is_not_found());
    }

    #[test]
    fn test_into_core_error() {
        let err = Error::Status {
            status: StatusCode::FORBIDDEN,
            url: "http://hub/proxies".to_string(),
        };
        let core: stager_core::Error = err.into();
        assert!(
            matches!(core, stager_core::Error::AuthResolution(ref m) if m.contains("403")),
            "{core}"
        );

        let io = Error::Io(std::io::Error::other("disk full"));
        assert!(matches!(stager_core::Error::from(io), stager_core::Error::Io(_)));
    }

    #[test]
    fn test_download_error() {
        let err = Error::Status {
            status: StatusCode::NOT_FOUND,
            url: "http://hub/files/9".to_string(),
        };
        assert!(matches!(
            err.into_download_error(),
            stager_core::Error::Other(ref m) if m.contains("files/9")
        ));
        let io = Error::Io(std::io::Error::other("disk full"));
        assert!(matches!(io.into_download_error(), stager_core::Error::Io(_)));
    }
}
