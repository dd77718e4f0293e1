//! Error types for the directory streaming core.
//!
//! Only conditions detected before the first byte of a listing is written
//! are meant to reach the client as structured errors. Everything raised
//! later either ends the stream or is absorbed by the pipeline.

use thiserror::Error;

/// Errors raised while setting up the core outside of a listing.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A configuration error (invalid values, unparsable numbers).
    #[error("Config error: {0}")]
    Config(String),

    /// A low-level I/O error, such as an unreadable working directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while resolving and opening the requested directory.
#[derive(Error, Debug)]
pub enum ListingError {
    /// The request path normalises to a location outside the root.
    #[error("Forbidden path: {0}")]
    Forbidden(String),

    /// The requested directory does not exist.
    #[error("Directory not found: {0}")]
    NotFound(String),

    /// The process may not read the requested directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The requested path exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// Opening the directory failed for another reason.
    #[error("Failed to open directory: {0}")]
    OpenFailed(String),

    /// Reading the next entry from an open directory failed.
    #[error("Failed to read directory entry: {0}")]
    Enumeration(String),
}

impl ListingError {
    /// Whether this error should be reported as a containment violation.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ListingError::Forbidden(_))
    }
}

/// Errors that end a listing after streaming has started.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The consumer went away or its sink refused further data.
    #[error("Consumer disconnected")]
    ConsumerDisconnected,

    /// The server is shutting down.
    #[error("Listing cancelled")]
    Cancelled,

    /// A record could not be serialised.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The directory handle failed mid-walk.
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// A low-level I/O error on the sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StreamError {
    /// Disconnects originate from the consumer and are not application errors.
    pub fn is_disconnect(&self) -> bool {
        match self {
            StreamError::ConsumerDisconnected => true,
            StreamError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }
}

/// Map `std::io::Error` from opening a directory to a `ListingError`.
pub fn map_io_error(e: std::io::Error, path: &str) -> ListingError {
    match e.kind() {
        std::io::ErrorKind::NotFound => ListingError::NotFound(path.to_string()),
        std::io::ErrorKind::PermissionDenied => ListingError::PermissionDenied(path.to_string()),
        std::io::ErrorKind::NotADirectory => ListingError::NotADirectory(path.to_string()),
        _ => ListingError::OpenFailed(format!("{}: {}", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_error_display() {
        let err = ListingError::Forbidden("/../etc".into());
        assert_eq!(err.to_string(), "Forbidden path: /../etc");

        let err = ListingError::NotFound("/data/missing".into());
        assert_eq!(err.to_string(), "Directory not found: /data/missing");

        let err = ListingError::NotADirectory("/data/a.txt".into());
        assert_eq!(err.to_string(), "Not a directory: /data/a.txt");
    }

    #[test]
    fn only_forbidden_is_forbidden() {
        assert!(ListingError::Forbidden("x".into()).is_forbidden());
        assert!(!ListingError::NotFound("x".into()).is_forbidden());
        assert!(!ListingError::OpenFailed("x".into()).is_forbidden());
    }

    #[test]
    fn map_io_error_by_kind() {
        let e = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(map_io_error(e, "/a"), ListingError::NotFound(p) if p == "/a"));

        let e = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        assert!(matches!(
            map_io_error(e, "/b"),
            ListingError::PermissionDenied(p) if p == "/b"
        ));

        let e = std::io::Error::new(std::io::ErrorKind::Other, "weird");
        let mapped = map_io_error(e, "/c");
        assert_eq!(mapped.to_string(), "Failed to open directory: /c: weird");
    }

    #[test]
    fn disconnect_classification() {
        assert!(StreamError::ConsumerDisconnected.is_disconnect());

        let pipe = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broke");
        assert!(StreamError::from(pipe).is_disconnect());

        let other = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        assert!(!StreamError::from(other).is_disconnect());

        let listing = StreamError::from(ListingError::Enumeration("eio".into()));
        assert!(!listing.is_disconnect());
    }
}
