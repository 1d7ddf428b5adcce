//! Record Event Logger
//!
//! One structured event per analysed record, emitted at target `ocr_records`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use maa_ocrlog_core::RecordBlock;

#[derive(Debug, Serialize)]
pub struct RecordEvent {
    pub logged_at: DateTime<Utc>,
    /// Timestamp copied from the log line.
    pub log_timestamp: String,
    pub task: String,
    pub uid: u64,
    pub model: String,
    /// Normalized expected texts, duplicates collapsed.
    pub expected: Vec<String>,
    pub hits: usize,
    pub misses: usize,
    pub failed: bool,
}

impl RecordEvent {
    pub fn from_block(block: &RecordBlock) -> Self {
        Self {
            logged_at: Utc::now(),
            log_timestamp: block.record.timestamp.clone(),
            task: block.record.task.clone(),
            uid: block.record.uid,
            model: block.record.model_display().to_string(),
            expected: block.record.expected().iter().map(str::to_string).collect(),
            hits: block.hits(),
            misses: block.misses(),
            failed: block.failed(),
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    pub fn log_record(block: &RecordBlock) {
        let event = RecordEvent::from_block(block);
        let json = serde_json::to_string(&event).unwrap_or_default();
        info!(target: "ocr_records", uid = event.uid, event = %json, "OCR record analysed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maa_ocrlog_core::{analyze, EmptyTaskPolicy};

    #[test]
    fn event_carries_record_counts() {
        let line = r#"[2024-05-01 08:00:00][Px1][Tx2][MaaNS::VisionNS::OCRer::analyze] Recruit [uid_=42] [all_results_=[{"box":[1,2,3,4],"score":0.9,"text":"Agent"},{"box":[1,2,3,4],"score":0.3,"text":"Noise"}]] [param_.model=] [param_.only_rec=true] [param_.expected=["Agent"]]"#;
        let analysis = analyze([line], "Recruit", EmptyTaskPolicy::Literal).unwrap();
        let event = RecordEvent::from_block(&analysis.blocks[0]);
        assert_eq!(event.uid, 42);
        assert_eq!(event.hits, 1);
        assert_eq!(event.misses, 1);
        assert!(!event.failed);
        assert_eq!(event.model, "default model");
        assert_eq!(event.expected, vec!["Agent".to_string()]);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["log_timestamp"], "2024-05-01 08:00:00");
    }
}
