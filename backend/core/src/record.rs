//! Line tokenizer: pulls one `OCRer::analyze` record out of a raw log line.
//!
//! The line grammar is fixed. Only the task name varies, and it is always
//! embedded as an escaped literal.

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::expected::ExpectedSet;
use crate::results::ResultArray;

/// Call site that emits the OCR analysis lines.
pub const OCR_ANALYZE_MARKER: &str = "MaaNS::VisionNS::OCRer::analyze]";

/// Shown in place of an empty model name.
pub const DEFAULT_MODEL_LABEL: &str = "default model";

const HEAD: &str = r"\[(?P<timestamp>.*?)\]\[.*?(?P<pid>Px\d+).*?(?P<tid>Tx\d+).*?\]";
const TAIL: &str = concat!(
    r"\s+\[uid_=(?P<uid>[0-9]+)\].*?\[all_results_=(?P<results>\[.*?\])\]\s*",
    r".*?\[param_\.model=(?P<model>[^,\]]*)",
    r".*?\[param_\.only_rec=(?P<only_rec>[^,\]]*)",
    r".*?\[param_\.expected=\[(?P<expected>[^\]]+)",
);

/// What an empty target task name means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyTaskPolicy {
    /// The empty name is matched literally: the marker must be followed by
    /// whitespace and then directly by the `uid_` field.
    #[default]
    Literal,
    /// An empty name matches any task.
    AnyTask,
}

impl std::str::FromStr for EmptyTaskPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "any" | "any_task" | "any-task" => Ok(Self::AnyTask),
            other => Err(format!("unknown empty-task policy: {other}")),
        }
    }
}

/// One matched OCR analysis line for the target task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRecord {
    pub timestamp: String,
    pub process_id: String,
    pub thread_id: String,
    /// Task name as it appears on the line.
    pub task: String,
    pub uid: u64,
    /// Unparsed recognition array, brackets included.
    pub raw_results: String,
    /// Empty means the default model.
    pub model_name: String,
    pub only_recognition: bool,
    /// Unparsed comma-separated expected texts.
    pub raw_expected: String,
}

impl TaskRecord {
    /// Model name for display; blank names resolve to [`DEFAULT_MODEL_LABEL`].
    pub fn model_display(&self) -> &str {
        if self.model_name.trim().is_empty() {
            DEFAULT_MODEL_LABEL
        } else {
            &self.model_name
        }
    }

    pub fn mode_label(&self) -> &'static str {
        if self.only_recognition {
            "recognition-only"
        } else {
            "detect+recognize"
        }
    }

    pub fn results(&self) -> ResultArray<'_> {
        ResultArray::new(&self.raw_results)
    }

    pub fn expected(&self) -> ExpectedSet {
        ExpectedSet::parse(&self.raw_expected)
    }
}

/// Compiled line grammar for a single target task.
#[derive(Debug, Clone)]
pub struct TaskExtractor {
    pattern: Regex,
}

impl TaskExtractor {
    pub fn new(target_task: &str, policy: EmptyTaskPolicy) -> Result<Self> {
        let task = if target_task.is_empty() && policy == EmptyTaskPolicy::AnyTask {
            r"\S+".to_string()
        } else {
            regex::escape(target_task)
        };
        let pattern = format!(
            r"{HEAD}.*?{marker}\s+(?P<task>{task}){TAIL}",
            marker = regex::escape(OCR_ANALYZE_MARKER),
        );
        Ok(Self {
            pattern: Regex::new(&pattern)?,
        })
    }

    /// Returns the record on `line`, or `None` when any field fails to match.
    pub fn extract(&self, line: &str) -> Option<TaskRecord> {
        let caps = self.pattern.captures(line)?;
        let uid = match caps["uid"].parse::<u64>() {
            Ok(uid) => uid,
            Err(e) => {
                debug!(uid = &caps["uid"], error = %e, "uid out of range; line skipped");
                return None;
            }
        };
        Some(TaskRecord {
            timestamp: caps["timestamp"].to_string(),
            process_id: caps["pid"].to_string(),
            thread_id: caps["tid"].to_string(),
            task: caps["task"].to_string(),
            uid,
            raw_results: caps["results"].to_string(),
            model_name: caps["model"].to_string(),
            only_recognition: &caps["only_rec"] == "true",
            raw_expected: caps["expected"].to_string(),
        })
    }
}

/// One-shot extraction with the literal empty-task policy.
///
/// Compiles the grammar on every call; use [`TaskExtractor`] when scanning
/// many lines.
pub fn extract(line: &str, target_task: &str) -> Result<Option<TaskRecord>> {
    Ok(TaskExtractor::new(target_task, EmptyTaskPolicy::Literal)?.extract(line))
}
