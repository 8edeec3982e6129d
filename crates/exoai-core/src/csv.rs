//! # CSV Shaping
//!
//! Export of JSON records to CSV and the batch-annotation path used by the
//! offline `predict-csv` substitute.
//!
//! ## Column order
//!
//! The header is the key set of the FIRST record, in its key order. Every
//! later record is written in that column order whatever its own key order;
//! keys it lacks become empty cells and keys the first record lacks are
//! dropped.
//!
//! ## Dialect
//!
//! Comma separated, `"`-quoted when a cell contains a comma, quote or line
//! break, quotes doubled inside quoted cells, `\n` line endings. The parser
//! also accepts `\r\n` and skips `#` comment lines, as KOI exports carry them.

use crate::heuristic::{self, TransitSignal};
use crate::types::{DatasetRow, ExoError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Column appended with the predicted class.
pub const PREDICTED_CLASS_COLUMN: &str = "predicted_class";

/// Column appended with the probability of the predicted class.
pub const CONFIDENCE_COLUMN: &str = "confidence";

// =============================================================================
// WRITING
// =============================================================================

fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn write_line<S: AsRef<str>>(out: &mut String, cells: &[S]) {
    let line: Vec<String> = cells.iter().map(|c| escape(c.as_ref())).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Render records as CSV with the first record's keys as header.
///
/// An empty slice renders as an empty string.
#[must_use]
pub fn export_records(records: &[Map<String, Value>]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let columns: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut out = String::new();
    write_line(&mut out, &columns);
    for record in records {
        let cells: Vec<String> = columns.iter().map(|c| cell_text(record.get(*c))).collect();
        write_line(&mut out, &cells);
    }
    out
}

/// Render dataset rows as CSV.
pub fn export_rows(rows: &[DatasetRow]) -> Result<String, ExoError> {
    let records = rows
        .iter()
        .map(DatasetRow::to_record)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(export_records(&records))
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse CSV text into rows of cells.
///
/// Blank lines and lines starting with `#` are skipped. A leading UTF-8 byte
/// order mark is dropped.
pub fn parse(text: &str) -> Result<Vec<Vec<String>>, ExoError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut at_line_start = true;
    let mut chars = text.chars().peekable();
    let mut line = 1usize;

    while let Some(c) = chars.next() {
        if at_line_start && !in_quotes {
            at_line_start = false;
            if c == '#' {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
                line += 1;
                at_line_start = true;
                continue;
            }
            if c == '\n' || c == '\r' {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line += 1;
                at_line_start = true;
                continue;
            }
        }

        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    cell.push(c);
                }
                _ => cell.push(c),
            }
            continue;
        }

        match c {
            '"' if cell.is_empty() => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cell)),
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
                line += 1;
                at_line_start = true;
            }
            _ => cell.push(c),
        }
    }

    if in_quotes {
        return Err(ExoError::Csv(format!("unterminated quoted cell at line {line}")));
    }
    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }
    Ok(rows)
}

// =============================================================================
// BATCH ANNOTATION
// =============================================================================

/// Classify every data row of a CSV with the heuristic.
///
/// The output repeats the input columns and appends `predicted_class` and
/// `confidence`. Every row is fitted to the header width first, padding short
/// rows and cutting cells past the last column, so the appended columns stay
/// aligned. Empty input yields the appended header only.
pub fn annotate_predictions(text: &str) -> Result<String, ExoError> {
    let mut rows = parse(text)?.into_iter();
    let mut out = String::new();

    let Some(mut header) = rows.next() else {
        write_line(&mut out, &[PREDICTED_CLASS_COLUMN, CONFIDENCE_COLUMN]);
        return Ok(out);
    };
    let width = header.len();
    let keys: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    header.push(PREDICTED_CLASS_COLUMN.to_string());
    header.push(CONFIDENCE_COLUMN.to_string());
    write_line(&mut out, &header);

    for mut row in rows {
        row.resize(width, String::new());
        let features: BTreeMap<String, f64> = keys
            .iter()
            .zip(&row)
            .filter_map(|(k, v)| v.trim().parse::<f64>().ok().map(|n| (k.clone(), n)))
            .collect();
        let (class, probabilities) = heuristic::classify(TransitSignal::from_features(&features));
        row.push(class.as_str().to_string());
        row.push(probabilities.get(class).to_string());
        write_line(&mut out, &row);
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn header_follows_first_record_and_rows_follow_header() {
        let records = vec![
            record(json!({"id": "KOI-1", "depth": 1200, "label": "confirmed"})),
            record(json!({"label": "candidate", "id": "KOI-2", "extra": true, "depth": 600})),
            record(json!({"id": "KOI-3"})),
        ];
        let csv = export_records(&records);
        assert_eq!(
            csv,
            "id,depth,label\nKOI-1,1200,confirmed\nKOI-2,600,candidate\nKOI-3,,\n"
        );
    }

    #[test]
    fn empty_export_is_empty() {
        assert_eq!(export_records(&[]), "");
    }

    #[test]
    fn cells_with_separators_are_quoted() {
        let records = vec![record(json!({"note": "deep, \"odd\" dip"}))];
        assert_eq!(export_records(&records), "note\n\"deep, \"\"odd\"\" dip\"\n");
    }

    #[test]
    fn parse_handles_quotes_comments_and_crlf() {
        let text = "# KOI export\r\na,b\r\n\"x, y\",\"say \"\"hi\"\"\"\r\n\r\n1,2";
        let rows = parse(text).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["x, y".to_string(), "say \"hi\"".to_string()],
                vec!["1".to_string(), "2".to_string()],
            ]
        );
    }

    #[test]
    fn parse_rejects_unterminated_quote() {
        assert!(matches!(parse("a\n\"open"), Err(ExoError::Csv(_))));
    }

    #[test]
    fn exported_text_parses_back_to_the_same_cells() {
        let records = vec![record(json!({"a": "1,2", "b": "line\nbreak"}))];
        let rows = parse(&export_records(&records)).unwrap();
        assert_eq!(rows[1], vec!["1,2".to_string(), "line\nbreak".to_string()]);
    }

    #[test]
    fn annotation_appends_class_and_confidence() {
        let input = "koi_period,koi_prad,koi_depth\n365,1.2,1200\n50,0.4,600\n1,0.1\n";
        let out = annotate_predictions(input).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "koi_period,koi_prad,koi_depth,predicted_class,confidence");
        assert_eq!(lines[1], "365,1.2,1200,confirmed,0.75");
        assert_eq!(lines[2], "50,0.4,600,candidate,0.6");
        assert_eq!(lines[3], "1,0.1,,false_positive,0.7");
    }

    #[test]
    fn annotation_of_empty_input_is_header_only() {
        assert_eq!(annotate_predictions("").unwrap(), "predicted_class,confidence\n");
    }

    #[test]
    fn annotation_ignores_byte_order_mark() {
        let plain = "transit_depth,planetary_radius,orbital_period\n1200,1.2,365\n";
        let with_bom = format!("\u{feff}{plain}");
        let out = annotate_predictions(&with_bom).unwrap();
        assert_eq!(out, annotate_predictions(plain).unwrap());
        assert!(out.starts_with("transit_depth,"));
        assert!(out.ends_with("1200,1.2,365,confirmed,0.75\n"));
    }

    #[test]
    fn annotation_cuts_rows_wider_than_header() {
        let out = annotate_predictions("a,b\n1,2,3\n").unwrap();
        let rows = parse(&out).unwrap();
        assert_eq!(rows[0].len(), rows[1].len());
        assert_eq!(out, "a,b,predicted_class,confidence\n1,2,false_positive,0.7\n");
    }
}
