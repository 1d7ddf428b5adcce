//! Core engine for MAA OCR log analysis.
//!
//! Extracts `OCRer::analyze` records for one task from raw log lines, decodes
//! the recognition results and expected texts, and classifies every result as
//! a hit or a miss.

pub mod analyzer;
pub mod error;
pub mod expected;
pub mod record;
pub mod report;
pub mod results;

pub use analyzer::{analyze, Analysis, RecordBlock, Summary};
pub use error::{OcrLogError, Result};
pub use expected::ExpectedSet;
pub use record::{extract, EmptyTaskPolicy, TaskExtractor, TaskRecord};
pub use report::{report, MatchOutcome, ReportLine};
pub use results::{decode_results, RecognitionResult, ResultArray};
