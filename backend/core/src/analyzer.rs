//! Single-pass analysis of a loaded log.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::record::{EmptyTaskPolicy, TaskExtractor, TaskRecord};
use crate::report::{report, MatchOutcome, ReportLine};

/// Report block of one matched record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordBlock {
    pub record: TaskRecord,
    pub lines: Vec<ReportLine>,
}

impl RecordBlock {
    pub fn hits(&self) -> usize {
        self.count(MatchOutcome::Hit)
    }

    /// Includes the no-results sentinel.
    pub fn misses(&self) -> usize {
        self.count(MatchOutcome::Miss)
    }

    pub fn has_no_results(&self) -> bool {
        self.lines.iter().any(|l| matches!(l, ReportLine::NoResults))
    }

    pub fn failed(&self) -> bool {
        self.lines.iter().any(|l| matches!(l, ReportLine::Failure { .. }))
    }

    fn count(&self, outcome: MatchOutcome) -> usize {
        self.lines
            .iter()
            .filter(|l| l.outcome() == Some(outcome))
            .count()
    }
}

/// Totals over a whole analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub lines_scanned: usize,
    pub records: usize,
    pub hits: usize,
    pub misses: usize,
    pub empty_records: usize,
    pub failed_records: usize,
}

impl Summary {
    fn add(&mut self, block: &RecordBlock) {
        self.records += 1;
        self.hits += block.hits();
        self.misses += block.misses();
        if block.has_no_results() {
            self.empty_records += 1;
        }
        if block.failed() {
            self.failed_records += 1;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub task: String,
    pub policy: EmptyTaskPolicy,
    pub blocks: Vec<RecordBlock>,
    pub summary: Summary,
}

impl Analysis {
    /// All report lines in log order.
    pub fn report_lines(&self) -> impl Iterator<Item = &ReportLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }
}

/// Scan `lines` for OCR records of `target_task` and build their reports.
///
/// The task name is trimmed before use. Lines that do not match the record
/// grammar are skipped; a bad score only cuts short its own record.
pub fn analyze<I, S>(lines: I, target_task: &str, policy: EmptyTaskPolicy) -> Result<Analysis>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let task = target_task.trim();
    let extractor = TaskExtractor::new(task, policy)?;
    info!(task, ?policy, "Analyzing OCR records");

    let mut blocks = Vec::new();
    let mut summary = Summary::default();

    for line in lines {
        summary.lines_scanned += 1;
        let Some(record) = extractor.extract(line.as_ref()) else {
            continue;
        };
        let expected = record.expected();
        let report_lines = report(&record, record.results().iter(), &expected);
        let block = RecordBlock {
            record,
            lines: report_lines,
        };
        summary.add(&block);
        blocks.push(block);
    }

    debug!(
        skipped = summary.lines_scanned - summary.records,
        "Lines without a matching record"
    );
    info!(
        records = summary.records,
        hits = summary.hits,
        misses = summary.misses,
        failed = summary.failed_records,
        "Analysis complete"
    );

    Ok(Analysis {
        task: task.to_string(),
        policy,
        blocks,
        summary,
    })
}
