use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Transport-side stream error while reading a response body.
    #[error("transfer error: {0}")]
    Io(io::Error),
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: StatusCode },
    #[error("api error: {0}")]
    Api(String),
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("filesystem error: {0}")]
    Filesystem(io::Error),
    /// A write failed and the partial file could not be removed either,
    /// leaving an orphan at `path`.
    #[error("write failed ({write}) and removing partial file {} also failed: {remove}", path.display())]
    Cleanup {
        path: PathBuf,
        write: String,
        remove: io::Error,
    },
    #[error("cancelled")]
    Cancelled,
}

impl Error {
    /// Whether the error is a transport-class failure worth retrying.
    /// Bad statuses, API errors, decode failures and disk errors are
    /// permanent and surface immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect() || e.is_body(),
            Error::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(error: reqwest_middleware::Error) -> Self {
        match error {
            reqwest_middleware::Error::Reqwest(e) => Error::Network(e),
            reqwest_middleware::Error::Middleware(e) => Error::Api(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_eof_is_transient() {
        let err = Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(err.is_transient());
    }

    #[test]
    fn connection_reset_is_transient() {
        let err = Error::Io(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(err.is_transient());
    }

    #[test]
    fn bad_status_is_permanent() {
        let err = Error::Status {
            url: "https://downloads.fanbox.cc/a.png".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn filesystem_errors_are_permanent() {
        let err = Error::Filesystem(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(!err.is_transient());
        let err = Error::Io(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(!err.is_transient());
    }

    #[test]
    fn cancellation_is_permanent() {
        assert!(!Error::Cancelled.is_transient());
    }
}
