//! Catalog document parsing with record-level recovery
//!
//! Catalog files are produced by offline scripts and are sometimes
//! hand-edited, so a single bad record must not take the whole catalog down.
//! A well-formed document is parsed as a JSON array and converted element by
//! element. A malformed document is cut into top-level `{...}` spans by a
//! small bracket scanner and each span is parsed on its own.

use std::ops::Range;

use clausematch_core::{Error, TemplateEntry};
use serde_json::Value;
use tracing::warn;

/// Result of parsing one catalog document
#[derive(Debug, Default)]
pub struct ParsedCatalog {
    pub entries: Vec<TemplateEntry>,
    /// Records that could not be turned into an entry
    pub dropped: usize,
    /// True when the document was malformed as a whole and the record
    /// scanner was used
    pub recovered: bool,
}

impl ParsedCatalog {
    /// Number of records seen, loadable or not
    pub fn records(&self) -> usize {
        self.entries.len() + self.dropped
    }
}

/// Remove whole-line `#` and `//` comments
pub fn strip_comment_lines(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let t = line.trim_start();
            !(t.starts_with('#') || t.starts_with("//"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a catalog document, recovering what can be recovered
pub fn parse_catalog(text: &str) -> ParsedCatalog {
    let cleaned = strip_comment_lines(text.trim_start_matches('\u{feff}'));
    if cleaned.trim().is_empty() {
        return ParsedCatalog::default();
    }

    match serde_json::from_str::<Vec<Value>>(&cleaned) {
        Ok(values) => parse_values(values),
        Err(e) => {
            warn!(
                "Catalog document is not valid JSON ({}); recovering record by record",
                e
            );
            recover_records(&cleaned)
        }
    }
}

fn parse_values(values: Vec<Value>) -> ParsedCatalog {
    let mut parsed = ParsedCatalog::default();

    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<TemplateEntry>(value) {
            Ok(entry) => parsed.entries.push(entry),
            Err(e) => {
                let err = Error::MalformedCatalogEntry {
                    index,
                    reason: e.to_string(),
                };
                warn!("Skipping record: {}", err);
                parsed.dropped += 1;
            }
        }
    }

    parsed
}

fn recover_records(text: &str) -> ParsedCatalog {
    let mut parsed = ParsedCatalog {
        recovered: true,
        ..Default::default()
    };

    for (index, span) in scan_records(text).into_iter().enumerate() {
        let result = match span {
            RecordSpan::Complete(range) => {
                serde_json::from_str::<TemplateEntry>(&text[range]).map_err(|e| e.to_string())
            }
            RecordSpan::Broken { at, reason } => Err(format!("{} at byte {}", reason, at)),
        };

        match result {
            Ok(entry) => parsed.entries.push(entry),
            Err(reason) => {
                warn!("Skipping record: {}", Error::MalformedCatalogEntry { index, reason });
                parsed.dropped += 1;
            }
        }
    }

    parsed
}

/// A top-level record found by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RecordSpan {
    /// Balanced `{...}` span, not yet known to be valid JSON
    Complete(Range<usize>),
    /// Record that could not be delimited
    Broken { at: usize, reason: &'static str },
}

/// Cut a document into top-level object spans.
///
/// Tracks string and escape state so brackets inside strings are ignored.
/// Raw newlines cannot occur inside a JSON string, so an open string is
/// closed at the end of its line to keep one bad quote from flipping the rest
/// of the file. Once that happens inside a record, the record is suspect and
/// any `{` opening a line starts the next record. Characters outside any
/// record are skipped.
pub(crate) fn scan_records(text: &str) -> Vec<RecordSpan> {
    let mut spans = Vec::new();
    let mut open: Option<(usize, Vec<char>)> = None;

    let mut in_string = false;
    let mut escaped = false;
    let mut line_start = true;
    let mut last_token: Option<char> = None;
    // Open record had a string cut off at a newline
    let mut suspect = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                '\n' => {
                    in_string = false;
                    line_start = true;
                    suspect |= open.is_some();
                }
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        if c.is_whitespace() {
            if c == '\n' {
                line_start = true;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                escaped = false;
            }
            '{' => match open.as_mut() {
                None => {
                    open = Some((i, vec!['{']));
                    suspect = false;
                }
                Some((_, stack)) => {
                    if line_start && (suspect || matches!(last_token, Some(',' | '[' | '}'))) {
                        spans.push(RecordSpan::Broken {
                            at: i,
                            reason: "record truncated before the next record",
                        });
                        open = Some((i, vec!['{']));
                        suspect = false;
                    } else {
                        stack.push('{');
                    }
                }
            },
            '[' => {
                if let Some((_, stack)) = open.as_mut() {
                    stack.push('[');
                }
            }
            '}' | ']' => {
                if let Some((start, stack)) = open.as_mut() {
                    let expected = match stack.last() {
                        Some('[') => ']',
                        _ => '}',
                    };
                    if c == expected {
                        stack.pop();
                        if stack.is_empty() {
                            spans.push(RecordSpan::Complete(*start..i + 1));
                            open = None;
                        }
                    } else {
                        spans.push(RecordSpan::Broken {
                            at: i,
                            reason: "mismatched closing bracket",
                        });
                        open = None;
                    }
                }
            }
            _ => {}
        }

        last_token = Some(c);
        line_start = false;
    }

    if let Some((start, _)) = open {
        spans.push(RecordSpan::Broken {
            at: start,
            reason: "record not closed before end of document",
        });
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(i: usize) -> String {
        format!(
            r#"  {{
    "template": "模板_{i}",
    "template1": "买卖合同",
    "template2": "",
    "vectors": {{
      "text1": [0.1, 0.2, 0.3],
      "text2": [0.3, 0.2, 0.1]
    }}
  }}"#
        )
    }

    fn document(records: &[String]) -> String {
        format!("[\n{}\n]", records.join(",\n"))
    }

    fn ids(parsed: &ParsedCatalog) -> Vec<String> {
        parsed.entries.iter().map(|e| e.template_id.clone()).collect()
    }

    #[test]
    fn test_well_formed_document() {
        let records: Vec<_> = (0..5).map(record).collect();
        let parsed = parse_catalog(&document(&records));

        assert_eq!(parsed.entries.len(), 5);
        assert_eq!(parsed.dropped, 0);
        assert!(!parsed.recovered);
    }

    #[test]
    fn test_invalid_element_in_valid_document() {
        let mut records: Vec<_> = (0..3).map(record).collect();
        records[1] = r#"{"template1": "no id"}"#.to_string();
        let parsed = parse_catalog(&document(&records));

        assert_eq!(ids(&parsed), vec!["模板_0", "模板_2"]);
        assert_eq!(parsed.dropped, 1);
        assert!(!parsed.recovered);
    }

    #[test]
    fn test_syntax_error_inside_balanced_record() {
        let mut records: Vec<_> = (0..10).map(record).collect();
        records[4] = records[4].replace("[0.1, 0.2, 0.3]", "[0.1, , 0.3]");
        let parsed = parse_catalog(&document(&records));

        assert!(parsed.recovered);
        assert_eq!(parsed.entries.len(), 9);
        assert_eq!(parsed.dropped, 1);
        assert!(!ids(&parsed).contains(&"模板_4".to_string()));
    }

    #[test]
    fn test_truncated_record_mismatched_bracket() {
        let mut records: Vec<_> = (0..10).map(record).collect();
        // Vector array never closed; the next `}` closes the wrong bracket
        records[6] = records[6].replace("0.1, 0.2, 0.3],", "0.1, 0.2,");
        let parsed = parse_catalog(&document(&records));

        assert_eq!(parsed.entries.len(), 9);
        assert_eq!(parsed.dropped, 1);
        assert_eq!(parsed.records(), 10);
    }

    #[test]
    fn test_truncated_record_missing_final_brace() {
        let mut records: Vec<_> = (0..10).map(record).collect();
        let cut = records[2].rfind('}').unwrap();
        records[2].truncate(cut);
        let parsed = parse_catalog(&document(&records));

        assert_eq!(parsed.entries.len(), 9);
        assert_eq!(parsed.dropped, 1);
        assert!(ids(&parsed).contains(&"模板_3".to_string()));
    }

    #[test]
    fn test_truncated_record_inside_string() {
        let mut records: Vec<_> = (0..10).map(record).collect();
        let cut = records[4].find(r#""template1": ""#).unwrap() + r#""template1": ""#.len();
        records[4].truncate(cut);
        let parsed = parse_catalog(&document(&records));

        assert!(parsed.recovered);
        assert_eq!(parsed.entries.len(), 9);
        assert_eq!(parsed.dropped, 1);
        assert_eq!(parsed.records(), 10);
        assert!(ids(&parsed).contains(&"模板_5".to_string()));
        assert!(!ids(&parsed).contains(&"模板_4".to_string()));
    }

    #[test]
    fn test_trailing_comma_recovers_everything() {
        let records: Vec<_> = (0..3).map(record).collect();
        let text = format!("[\n{},\n]", records.join(",\n"));
        let parsed = parse_catalog(&text);

        assert!(parsed.recovered);
        assert_eq!(parsed.entries.len(), 3);
        assert_eq!(parsed.dropped, 0);
    }

    #[test]
    fn test_comment_lines_are_stripped() {
        let text = format!(
            "# generated by export script\n[\n// first record\n{}\n]",
            record(0)
        );
        let parsed = parse_catalog(&text);

        assert_eq!(parsed.entries.len(), 1);
        assert!(!parsed.recovered);
    }

    #[test]
    fn test_brackets_inside_strings_are_ignored() {
        let text = r#"[{"template": "a{[", "vectors": {"text1": [1.0]}}, {"template": "b\"}", "vectors": {}},]"#;
        let parsed = parse_catalog(text);

        assert_eq!(ids(&parsed), vec!["a{[", "b\"}"]);
        assert_eq!(parsed.dropped, 0);
    }

    #[test]
    fn test_unclosed_document() {
        let text = format!("[\n{},\n{}", record(0), &record(1)[..40]);
        let parsed = parse_catalog(&text);

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.dropped, 1);
    }

    #[test]
    fn test_empty_documents() {
        assert_eq!(parse_catalog("").records(), 0);
        assert_eq!(parse_catalog("  \n# nothing here\n").records(), 0);
        assert_eq!(parse_catalog("[]").records(), 0);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let mut records: Vec<_> = (0..4).map(record).collect();
        records[1] = records[1].replace("]\n", "\n");
        let text = document(&records);
        assert_eq!(scan_records(&text), scan_records(&text));
    }
}
