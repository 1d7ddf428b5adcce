//! Structured logging for the OCR log analyzer.
//!
//! Console diagnostics on stderr, optional rolling NDJSON files, and one
//! structured event per analysed record.

pub mod event_logger;
pub mod logger;

pub use event_logger::{EventLogger, RecordEvent};
pub use logger::init_logger;
