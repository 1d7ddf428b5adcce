//! Decoder for the `all_results_` array.
//!
//! Entries are found by scanning, not by a JSON parser: log lines are often
//! truncated or carry unescaped content, and anything that does not look like
//! a `{"box": [..], "score": .., "text": ".."}` object is skipped.

use once_cell::sync::Lazy;
use regex::{CaptureMatches, Captures, Regex};
use serde::Serialize;
use tracing::warn;

use crate::error::{OcrLogError, Result};

static ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\{\s*"box":\s*\[(?P<box>.*?)\]\s*,\s*"score":\s*(?P<score>[0-9.]+)\s*,\s*"text":\s*"(?P<text>(?:[^"\\]|\\.)*)"\s*\}"#,
    )
    .expect("recognition entry pattern is valid")
});

/// One OCR-detected text region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionResult {
    /// Raw coordinate list, not validated.
    #[serde(rename = "box")]
    pub roi: String,
    pub score: f64,
    /// Unescaped text, surrounding whitespace removed.
    pub text: String,
}

/// Raw result array of a record. Each call to [`ResultArray::iter`] rescans
/// from the start.
#[derive(Debug, Clone, Copy)]
pub struct ResultArray<'a> {
    raw: &'a str,
}

impl<'a> ResultArray<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    pub fn iter(&self) -> Results<'a> {
        decode_results(self.raw)
    }
}

impl<'a> IntoIterator for &ResultArray<'a> {
    type Item = Result<RecognitionResult>;
    type IntoIter = Results<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy, document-ordered sequence of decoded entries.
pub struct Results<'a> {
    matches: CaptureMatches<'static, 'a>,
}

impl Iterator for Results<'_> {
    type Item = Result<RecognitionResult>;

    fn next(&mut self) -> Option<Self::Item> {
        self.matches.next().map(|caps| decode_entry(&caps))
    }
}

/// Decode the entries of a raw `all_results_` array, left to right.
pub fn decode_results(raw: &str) -> Results<'_> {
    Results {
        matches: ENTRY_RE.captures_iter(raw),
    }
}

fn decode_entry(caps: &Captures<'_>) -> Result<RecognitionResult> {
    let token = &caps["score"];
    let score = token.parse::<f64>().map_err(|source| {
        warn!(token, "unparseable recognition score");
        OcrLogError::MalformedScore {
            token: token.to_string(),
            source,
        }
    })?;
    Ok(RecognitionResult {
        roi: caps["box"].to_string(),
        score,
        text: unescape(&caps["text"]).trim().to_string(),
    })
}

/// Resolves `\"` and `\\`. Any other backslash sequence is kept verbatim.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('"' | '\\')) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(raw: &str) -> Vec<RecognitionResult> {
        decode_results(raw).collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn empty_array_yields_nothing() {
        assert!(decode_all("[]").is_empty());
        assert_eq!(ResultArray::new("[]").iter().count(), 0);
    }

    #[test]
    fn decodes_entries_in_order() {
        let raw = r#"[{"box":[1,2,3,4],"score":0.9123,"text":"Agent"}, { "box": [5, 6, 7, 8], "score": 0.5, "text": " Other " }]"#;
        let results = decode_all(raw);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].roi, "1,2,3,4");
        assert_eq!(results[0].score, 0.9123);
        assert_eq!(results[0].text, "Agent");
        assert_eq!(results[1].roi, "5, 6, 7, 8");
        assert_eq!(results[1].text, "Other");
    }

    #[test]
    fn unescapes_quotes_and_backslashes() {
        let raw = r#"[{"box":[0,0,1,1],"score":1,"text":"say \"hi\" C:\\dir \n"}]"#;
        let results = decode_all(raw);
        assert_eq!(results[0].text, r#"say "hi" C:\dir \n"#);
    }

    #[test]
    fn non_matching_objects_are_skipped() {
        let raw = r#"[{"box":[1,2,3,4],"text":"no score"},{"box":[1,2,3,4],"score":0.7,"text":"ok"}]"#;
        let results = decode_all(raw);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "ok");
    }

    #[test]
    fn scores_outside_unit_range_are_kept() {
        let raw = r#"[{"box":[0],"score":1.5,"text":"x"},{"box":[0],"score":0,"text":"y"},{"box":[0],"score":42.125,"text":"z"}]"#;
        let scores: Vec<f64> = decode_all(raw).iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![1.5, 0.0, 42.125]);
    }

    #[test]
    fn malformed_score_is_an_error() {
        let raw = r#"[{"box":[1,2,3,4],"score":0.1.2,"text":"x"}]"#;
        let err = decode_results(raw).next().unwrap().unwrap_err();
        assert!(matches!(err, OcrLogError::MalformedScore { ref token, .. } if token == "0.1.2"));
    }

    #[test]
    fn sequence_is_restartable() {
        let raw = r#"[{"box":[1,2,3,4],"score":0.9,"text":"a"},{"box":[1,2,3,4],"score":0.8,"text":"b"}]"#;
        let array = ResultArray::new(raw);
        assert_eq!(array.iter().count(), 2);
        let texts: Vec<String> = array.iter().map(|r| r.unwrap().text).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }
}
