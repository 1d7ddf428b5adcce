mod config;
mod terminal_output;

use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use maa_ocrlog_core::{analyze, Analysis, EmptyTaskPolicy, OcrLogError};
use maa_ocrlog_logging::{init_logger, EventLogger};

use config::Config;
use terminal_output::{note_error, note_warn, paint_line, render_table, stream_line, Column};

#[derive(Parser)]
#[command(name = "maa-ocrlog")]
#[command(about = "Checks MAA OCR log records against their expected texts")]
#[command(version)]
struct Cli {
    /// Disable ANSI colour in the report
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report every OCR record of one task as hits and misses
    Analyze {
        /// Log file to scan
        file: PathBuf,
        /// Task name, matched literally
        #[arg(short, long, default_value = "")]
        task: String,
        /// Treat an empty task name as "every task"
        #[arg(long)]
        any_task: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Append a per-record summary table
        #[arg(long)]
        summary: bool,
    },
    /// List the tasks that have OCR records in a log file
    Tasks {
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if cli.no_color {
        config.color = false;
    }

    init_logger(&config.log_level, config.log_dir.as_deref());
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Analyze {
            file,
            task,
            any_task,
            format,
            summary,
        } => {
            let policy = if any_task {
                EmptyTaskPolicy::AnyTask
            } else {
                config.empty_task_policy
            };
            let Some(text) = read_or_report(&file, config.color) else {
                return Ok(ExitCode::FAILURE);
            };
            let analysis = analyze(text.lines(), &task, policy)?;
            for block in &analysis.blocks {
                EventLogger::log_record(block);
            }
            if analysis.blocks.is_empty() {
                let msg = format!(
                    "no OCR records for task '{}' in {}",
                    analysis.task,
                    file.display()
                );
                note_warn(&msg, config.color);
            }

            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            match format {
                OutputFormat::Text => {
                    for line in render_text(&analysis, config.color) {
                        stream_line(&mut out, &line)?;
                    }
                    if summary {
                        stream_line(&mut out, &render_summary(&analysis, config.color))?;
                    }
                }
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&analysis)
                        .context("Failed to serialize analysis")?;
                    stream_line(&mut out, &json)?;
                }
            }
        }
        Commands::Tasks { file } => {
            let Some(text) = read_or_report(&file, config.color) else {
                return Ok(ExitCode::FAILURE);
            };
            let analysis = analyze(text.lines(), "", EmptyTaskPolicy::AnyTask)?;
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            stream_line(&mut out, &render_task_overview(&analysis, config.color))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Read the whole log as UTF-8 text.
fn load_log(path: &Path) -> Result<String, OcrLogError> {
    let text = std::fs::read_to_string(path).map_err(|source| OcrLogError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = text.len(), "Loaded log file");
    Ok(text)
}

fn read_or_report(path: &Path, color: bool) -> Option<String> {
    match load_log(path) {
        Ok(text) => Some(text),
        Err(e) => {
            note_error(&e.to_string(), color);
            None
        }
    }
}

fn render_text(analysis: &Analysis, color: bool) -> Vec<String> {
    analysis
        .report_lines()
        .map(|line| paint_line(line, color))
        .collect()
}

fn render_summary(analysis: &Analysis, color: bool) -> String {
    let columns = [
        Column::right("UID"),
        Column::left("Timestamp"),
        Column::left("Model").max_width(24),
        Column::left("Mode"),
        Column::right("Hits"),
        Column::right("Misses"),
        Column::left("Status"),
    ];
    let rows: Vec<Vec<String>> = analysis
        .blocks
        .iter()
        .map(|block| {
            let status = if block.failed() {
                "error"
            } else if block.has_no_results() {
                "empty"
            } else {
                "ok"
            };
            vec![
                block.record.uid.to_string(),
                block.record.timestamp.clone(),
                block.record.model_display().to_string(),
                block.record.mode_label().to_string(),
                block.hits().to_string(),
                block.misses().to_string(),
                status.to_string(),
            ]
        })
        .collect();

    let s = &analysis.summary;
    let mut out = render_table(&columns, &rows, color);
    out.push_str(&format!(
        "\n{} records in {} lines: {} hits, {} misses, {} empty, {} failed",
        s.records, s.lines_scanned, s.hits, s.misses, s.empty_records, s.failed_records
    ));
    out
}

/// Per-task record and outcome counts, in order of first appearance.
fn task_overview(analysis: &Analysis) -> Vec<(String, usize, usize, usize)> {
    let mut tasks: Vec<(String, usize, usize, usize)> = Vec::new();
    for block in &analysis.blocks {
        let idx = match tasks.iter().position(|(name, ..)| *name == block.record.task) {
            Some(idx) => idx,
            None => {
                tasks.push((block.record.task.clone(), 0, 0, 0));
                tasks.len() - 1
            }
        };
        let entry = &mut tasks[idx];
        entry.1 += 1;
        entry.2 += block.hits();
        entry.3 += block.misses();
    }
    tasks
}

fn render_task_overview(analysis: &Analysis, color: bool) -> String {
    let columns = [
        Column::left("Task"),
        Column::right("Records"),
        Column::right("Hits"),
        Column::right("Misses"),
    ];
    let rows: Vec<Vec<String>> = task_overview(analysis)
        .into_iter()
        .map(|(task, records, hits, misses)| {
            vec![task, records.to_string(), hits.to_string(), misses.to_string()]
        })
        .collect();
    render_table(&columns, &rows, color)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = concat!(
        "[2024-05-01 10:00:00.001][INF][Px10][Tx20][main.cpp][L1] MaaFramework started\n",
        r#"[2024-05-01 10:00:01.002][INF][Px10][Tx21][OCRer.cpp][L88][MaaNS::VisionNS::OCRer::analyze] Recruit [uid_=7] [all_results_=[{"box":[1,2,3,4],"score":0.9123,"text":"Agent"}]] [param_.model=] [param_.only_rec=false] [param_.expected=["Agent"]]"#,
        "\n",
        r#"[2024-05-01 10:00:02.003][INF][Px10][Tx21][OCRer.cpp][L88][MaaNS::VisionNS::OCRer::analyze] Recruit [uid_=8] [all_results_=[{"box":[1,2,3,4],"score":0.8,"text":"Other"}]] [param_.model=] [param_.only_rec=false] [param_.expected=["Agent"]]"#,
        "\n",
        r#"[2024-05-01 10:00:03.004][INF][Px10][Tx21][OCRer.cpp][L88][MaaNS::VisionNS::OCRer::analyze] Recruit [uid_=9] [all_results_=[]] [param_.model=] [param_.only_rec=false] [param_.expected=["Agent"]]"#,
        "\n",
        r#"[2024-05-01 10:00:04.005][INF][Px10][Tx21][OCRer.cpp][L88][MaaNS::VisionNS::OCRer::analyze] Infrast [uid_=10] [all_results_=[]] [param_.model=ppocr] [param_.only_rec=true] [param_.expected=["Dorm"]]"#,
        "\n",
    );

    fn write_fixture(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("maa-ocrlog-{}-{name}.log", std::process::id()));
        std::fs::write(&path, LOG).unwrap();
        path
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let path = std::env::temp_dir().join("maa-ocrlog-does-not-exist.log");
        let err = load_log(&path).unwrap_err();
        assert!(matches!(err, OcrLogError::FileAccess { .. }));
        assert!(err.to_string().contains("maa-ocrlog-does-not-exist.log"));
    }

    #[test]
    fn invalid_utf8_is_file_access_error() {
        let path = std::env::temp_dir().join(format!("maa-ocrlog-{}-binary.log", std::process::id()));
        std::fs::write(&path, [0xff, 0xfe, b'[', 0x80]).unwrap();
        let err = load_log(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        match err {
            OcrLogError::FileAccess { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidData);
            }
            other => panic!("expected FileAccess, got {other:?}"),
        }
    }

    #[test]
    fn end_to_end_text_report() {
        let path = write_fixture("text");
        let text = load_log(&path).unwrap();
        let analysis = analyze(text.lines(), "Recruit", EmptyTaskPolicy::Literal).unwrap();
        let lines = render_text(&analysis, false);
        std::fs::remove_file(&path).ok();

        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("[2024-05-01 10:00:01.002] [Px10/Tx21]\nTask: Recruit [UID: 7]"));
        assert!(lines[0].contains("Model: default model | Mode: detect+recognize"));
        assert_eq!(lines[1], "✓ Hit | ROI: 1,2,3,4 | Text: Agent | Score: 0.9123");
        assert_eq!(lines[2], format!("{}\n", "-".repeat(100)));
        assert!(lines[4].starts_with("⚠ Miss | ROI: 1,2,3,4 | Text: Other"));
        assert_eq!(lines[7], "⚠ Miss - no recognition results found");
    }

    #[test]
    fn summary_lists_every_record() {
        let analysis = analyze(LOG.lines(), "Recruit", EmptyTaskPolicy::Literal).unwrap();
        let summary = render_summary(&analysis, false);
        assert!(summary.contains("empty"));
        assert!(summary.ends_with("3 records in 5 lines: 1 hits, 2 misses, 1 empty, 0 failed"));
    }

    #[test]
    fn task_overview_groups_by_task() {
        let analysis = analyze(LOG.lines(), "", EmptyTaskPolicy::AnyTask).unwrap();
        let overview = task_overview(&analysis);
        assert_eq!(
            overview,
            vec![("Recruit".to_string(), 3, 1, 2), ("Infrast".to_string(), 1, 0, 1)]
        );
    }

    #[test]
    fn json_output_is_structured() {
        let analysis = analyze(LOG.lines(), "Infrast", EmptyTaskPolicy::Literal).unwrap();
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["task"], "Infrast");
        assert_eq!(json["blocks"][0]["record"]["uid"], 10);
        assert_eq!(json["blocks"][0]["lines"][0]["mode"], "recognition-only");
        assert_eq!(json["blocks"][0]["lines"][1]["kind"], "no_results");
        assert_eq!(json["summary"]["records"], 1);
    }
}
