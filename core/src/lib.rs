//! Core of the directory streaming service.
//!
//! Turns one directory of a sandboxed root into a lazily produced sequence
//! of NDJSON records, delivered under consumer backpressure. HTTP concerns
//! live in the server crate.

pub mod config;
pub mod errors;
pub mod files;

pub use config::ServerConfig;
pub use errors::{CoreError, ListingError, StreamError};
pub use files::stream::{DirectoryLister, LineSink, StreamSummary, StreamWriter, WriterSink};
pub use files::{EntryRecord, EntryType};
