//! Matcher and report line model.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::expected::ExpectedSet;
use crate::record::TaskRecord;
use crate::results::RecognitionResult;

const SEPARATOR_WIDTH: usize = 100;

/// Whether a recognized text is one of the expected texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Hit,
    Miss,
}

impl MatchOutcome {
    /// Exact, case-sensitive membership of the trimmed text.
    pub fn classify(text: &str, expected: &ExpectedSet) -> Self {
        if expected.contains(text.trim()) {
            Self::Hit
        } else {
            Self::Miss
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            Self::Hit => "✓ Hit",
            Self::Miss => "⚠ Miss",
        }
    }
}

/// One entry of a record's report block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportLine {
    Header {
        timestamp: String,
        process_id: String,
        thread_id: String,
        task: String,
        uid: u64,
        model: String,
        mode: String,
        expected: String,
    },
    Result {
        outcome: MatchOutcome,
        #[serde(rename = "box")]
        roi: String,
        text: String,
        score: f64,
    },
    /// The record decoded to zero recognition results.
    NoResults,
    /// Decoding stopped early; later results of the record are not reported.
    Failure { reason: String },
    Separator,
}

impl ReportLine {
    pub fn header(record: &TaskRecord) -> Self {
        Self::Header {
            timestamp: record.timestamp.clone(),
            process_id: record.process_id.clone(),
            thread_id: record.thread_id.clone(),
            task: record.task.clone(),
            uid: record.uid,
            model: record.model_display().to_string(),
            mode: record.mode_label().to_string(),
            expected: record.raw_expected.clone(),
        }
    }

    pub fn result(result: RecognitionResult, expected: &ExpectedSet) -> Self {
        Self::Result {
            outcome: MatchOutcome::classify(&result.text, expected),
            roi: result.roi,
            text: result.text,
            score: result.score,
        }
    }

    /// Outcome carried by this line, if it is a result or the no-results sentinel.
    pub fn outcome(&self) -> Option<MatchOutcome> {
        match self {
            Self::Result { outcome, .. } => Some(*outcome),
            Self::NoResults => Some(MatchOutcome::Miss),
            _ => None,
        }
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header {
                timestamp,
                process_id,
                thread_id,
                task,
                uid,
                model,
                mode,
                expected,
            } => {
                writeln!(f, "[{timestamp}] [{process_id}/{thread_id}]")?;
                writeln!(f, "Task: {task} [UID: {uid}]")?;
                writeln!(f, "Model: {model} | Mode: {mode}")?;
                write!(f, "Expected: {expected}")
            }
            Self::Result {
                outcome,
                roi,
                text,
                score,
            } => write!(
                f,
                "{} | ROI: {roi} | Text: {text} | Score: {score:.4}",
                outcome.marker()
            ),
            Self::NoResults => write!(
                f,
                "{} - no recognition results found",
                MatchOutcome::Miss.marker()
            ),
            Self::Failure { reason } => write!(f, "✗ Error - {reason}"),
            Self::Separator => writeln!(f, "{}", "-".repeat(SEPARATOR_WIDTH)),
        }
    }
}

/// Build the ordered report block for one record.
///
/// Results are consumed in document order. The first decoding error ends the
/// result list with a [`ReportLine::Failure`]; the block is still closed with
/// a separator.
pub fn report<I>(record: &TaskRecord, results: I, expected: &ExpectedSet) -> Vec<ReportLine>
where
    I: IntoIterator<Item = Result<RecognitionResult>>,
{
    let mut lines = vec![ReportLine::header(record)];
    let mut decoded_any = false;

    for result in results {
        decoded_any = true;
        match result {
            Ok(result) => lines.push(ReportLine::result(result, expected)),
            Err(e) => {
                lines.push(ReportLine::Failure {
                    reason: e.to_string(),
                });
                break;
            }
        }
    }

    if !decoded_any {
        lines.push(ReportLine::NoResults);
    }
    lines.push(ReportLine::Separator);
    lines
}
