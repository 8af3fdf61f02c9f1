//! logstitch library
//!
//! Reconstructs logical, possibly multi-line, log messages from editor and
//! extension-host log files, and writes them out as CSV reports.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod model;
pub mod profile;
pub mod report;

pub use config::Config;
pub use engine::{Engine, LineEvent, MessageReconstructor};
pub use error::IngestError;
pub use ingest::{BatchResult, BatchRunner, FileScanner};
pub use model::{BatchStats, FileOutcome, FileReport, LogMessage, Provenance};
pub use profile::Profile;
