//! Terminal output utilities: ANSI formatting, report painting, table rendering.

use std::io::Write;

use maa_ocrlog_core::{MatchOutcome, ReportLine};

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm'
            for next in chars.by_ref() {
                if next == 'm' { break; }
            }
        } else {
            result.push(c);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

/// Print a formatted WARNING note to stderr.
pub fn note_warn(msg: &str, color: bool) {
    eprintln!("{}", warn_note(msg, color));
}

/// Print a formatted ERROR note to stderr.
pub fn note_error(msg: &str, color: bool) {
    eprintln!("{}", error_note(msg, color));
}

fn warn_note(msg: &str, color: bool) -> String {
    if color {
        format!("{YELLOW}{BOLD}⚠{RESET} {msg}")
    } else {
        format!("WARN: {msg}")
    }
}

fn error_note(msg: &str, color: bool) -> String {
    if color {
        format!("{RED}{BOLD}✗{RESET} {msg}")
    } else {
        format!("ERROR: {msg}")
    }
}

// ---------------------------------------------------------------------------
// Report lines
// ---------------------------------------------------------------------------

/// Render one report line, colouring its marker when `color` is set.
pub fn paint_line(line: &ReportLine, color: bool) -> String {
    let plain = line.to_string();
    if !color {
        return plain;
    }
    match line {
        ReportLine::Header { .. } => format!("{CYAN}{plain}{RESET}"),
        ReportLine::Result { outcome: MatchOutcome::Hit, .. } => format!("{GREEN}{plain}{RESET}"),
        ReportLine::Result { .. } | ReportLine::NoResults => format!("{YELLOW}{plain}{RESET}"),
        ReportLine::Failure { .. } => format!("{RED}{BOLD}{plain}{RESET}"),
        ReportLine::Separator => format!("{DIM}{plain}{RESET}"),
    }
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

/// Column alignment.
pub enum Align { Left, Right }

/// A table column definition.
pub struct Column {
    pub header: String,
    pub align: Align,
    pub max_width: Option<usize>,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Left, max_width: None }
    }
    pub fn right(header: impl Into<String>) -> Self {
        Self { header: header.into(), align: Align::Right, max_width: None }
    }
    pub fn max_width(mut self, width: usize) -> Self {
        self.max_width = Some(width);
        self
    }
}

/// Render a table with given columns and rows.
pub fn render_table(columns: &[Column], rows: &[Vec<String>], color: bool) -> String {
    let num_cols = columns.len();
    // Compute column widths.
    let mut widths: Vec<usize> = columns.iter().map(|c| display_width(&c.header)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(num_cols) {
            let w = display_width(cell);
            if w > widths[i] {
                widths[i] = match columns[i].max_width {
                    Some(max) => w.min(max).max(widths[i]),
                    None => w,
                };
            }
        }
    }

    let mut out = String::new();

    let header_cells: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| pad_cell(&col.header, widths[i], &col.align))
        .collect();
    if color {
        out.push_str(&format!("{BOLD}  {}  {RESET}\n", header_cells.join("  ")));
    } else {
        out.push_str(&format!("  {}  \n", header_cells.join("  ")));
    }

    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("  {}  \n", sep.join("  ")));

    for row in rows {
        let cells: Vec<String> = (0..num_cols)
            .map(|i| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                pad_cell(&truncate(cell, widths[i]), widths[i], &columns[i].align)
            })
            .collect();
        out.push_str(&format!("  {}  \n", cells.join("  ")));
    }

    out
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

fn truncate(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    let mut cut: String = strip_ansi(s).chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn pad_cell(s: &str, width: usize, align: &Align) -> String {
    let pad = width.saturating_sub(display_width(s));
    match align {
        Align::Left => format!("{s}{}", " ".repeat(pad)),
        Align::Right => format!("{}{s}", " ".repeat(pad)),
    }
}

// ---------------------------------------------------------------------------
// Streaming writer
// ---------------------------------------------------------------------------

/// Write one chunk followed by a newline, flushing after each.
pub fn stream_line(writer: &mut impl Write, chunk: &str) -> std::io::Result<()> {
    writer.write_all(chunk.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ansi() {
        let colored = format!("{GREEN}hello{RESET}");
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn notes_follow_color_flag() {
        assert_eq!(warn_note("no records", false), "WARN: no records");
        assert_eq!(error_note("cannot read", false), "ERROR: cannot read");
        assert!(warn_note("no records", true).starts_with(YELLOW));
        assert!(error_note("cannot read", true).starts_with(RED));
    }

    #[test]
    fn paints_only_when_enabled() {
        assert_eq!(paint_line(&ReportLine::NoResults, false), ReportLine::NoResults.to_string());
        let painted = paint_line(&ReportLine::NoResults, true);
        assert!(painted.starts_with(YELLOW));
        assert_eq!(strip_ansi(&painted), ReportLine::NoResults.to_string());
    }

    #[test]
    fn renders_table() {
        let cols = vec![Column::left("Task"), Column::right("Hits")];
        let rows = vec![
            vec!["Recruit".to_string(), "42".to_string()],
            vec!["Infrast".to_string(), "7".to_string()],
        ];
        let table = render_table(&cols, &rows, false);
        assert!(table.contains("Recruit"));
        assert!(table.contains("  7  "));
    }

    #[test]
    fn truncates_to_max_width() {
        let cols = vec![Column::left("Model").max_width(6)];
        let rows = vec![vec!["ppocr_v4_server".to_string()]];
        let table = render_table(&cols, &rows, false);
        assert!(table.contains("ppocr…"));
        assert!(!table.contains("ppocr_v4_server"));
    }

    #[test]
    fn stream_line_appends_newline() {
        let mut buf = Vec::new();
        stream_line(&mut buf, "abc").unwrap();
        assert_eq!(buf, b"abc\n");
    }
}
