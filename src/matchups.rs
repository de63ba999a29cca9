//! Snapshot rows: loading, actionable-row filtering, display formatting and
//! ordering.

use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EmptyCause, ReportError, Result};
use crate::logging::{debug, info, obj, v_num, v_str, Domain, ProfileScope};
use crate::projector::{ColumnMap, DisplaySchema, Field};
use crate::snapshot::content_digest;

/// Display text for any value that is absent or not a number.
pub const PLACEHOLDER: &str = "-";

/// Cell values read as missing, besides the empty string.
const MISSING_TOKENS: [&str; 17] = [
    "NA", "N/A", "n/a", "#N/A", "#N/A N/A", "#NA", "<NA>", "NaN", "-NaN", "nan", "-nan",
    "1.#IND", "1.#QNAN", "null", "NULL", "None", "-1.#IND",
];

/// One matchup as read from a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
    pub tournament: Option<String>,
    pub round: Option<String>,
    pub player1: Option<String>,
    pub player2: Option<String>,
    pub player1_prob: Option<f64>,
    pub player2_prob: Option<f64>,
    pub player1_odds: Option<f64>,
    pub player2_odds: Option<f64>,
}

/// A matchup with every field rendered as display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRow {
    pub tournament: String,
    pub round: String,
    pub player1: String,
    pub player2: String,
    pub player1_prob: String,
    pub player2_prob: String,
    pub player1_odds: String,
    pub player2_odds: String,
}

impl FormattedRow {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Tournament => &self.tournament,
            Field::Round => &self.round,
            Field::Player1 => &self.player1,
            Field::Player2 => &self.player2,
            Field::Player1Prob => &self.player1_prob,
            Field::Player2Prob => &self.player2_prob,
            Field::Player1Odds => &self.player1_odds,
            Field::Player2Odds => &self.player2_odds,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotRows {
    pub path: PathBuf,
    /// SHA-256 of the exact bytes the rows were parsed from.
    pub sha256: String,
    pub rows: Vec<MatchRow>,
}

/// Rows ready for projection plus the counts seen on the way.
#[derive(Debug, Clone)]
pub struct PreparedRows {
    pub rows: Vec<FormattedRow>,
    pub rows_read: usize,
    pub rows_retained: usize,
}

/// Parses a cell as a finite number; anything else is `None`.
pub fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if is_missing_token(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_missing_token(trimmed: &str) -> bool {
    trimmed.is_empty() || MISSING_TOKENS.contains(&trimmed)
}

fn text_cell(record: &StringRecord, idx: usize) -> Option<String> {
    let raw = record.get(idx)?;
    if is_missing_token(raw.trim()) {
        None
    } else {
        Some(raw.to_string())
    }
}

fn number_cell(record: &StringRecord, idx: usize) -> Option<f64> {
    record.get(idx).and_then(coerce_number)
}

fn invalid(path: &Path, err: impl std::fmt::Display) -> ReportError {
    ReportError::EmptyData {
        path: path.to_path_buf(),
        cause: EmptyCause::Invalid(err.to_string()),
    }
}

/// Reads every data row of a snapshot into fixed-shape records.
///
/// Emptiness is checked before the header is matched against `schema`, so a
/// header-only file reports as empty rather than as a schema mismatch.
pub fn load_rows(path: &Path, schema: &DisplaySchema) -> Result<SnapshotRows> {
    // one read: rows and digest come from the same bytes
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ReportError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => invalid(path, e),
    })?;
    if bytes.is_empty() {
        return Err(ReportError::EmptyData {
            path: path.to_path_buf(),
            cause: EmptyCause::ZeroBytes,
        });
    }

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(&bytes[..]);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| invalid(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(invalid(path, "no columns to parse"));
    }

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record.map_err(|e| invalid(path, e))?);
    }
    if records.is_empty() {
        return Err(ReportError::EmptyData {
            path: path.to_path_buf(),
            cause: EmptyCause::NoRows,
        });
    }

    let columns = schema.resolve_columns(&headers)?;
    let rows = records.iter().map(|r| match_row(r, &columns)).collect();
    Ok(SnapshotRows {
        path: path.to_path_buf(),
        sha256: content_digest(&bytes),
        rows,
    })
}

fn match_row(record: &StringRecord, columns: &ColumnMap) -> MatchRow {
    MatchRow {
        tournament: text_cell(record, columns.index_of(Field::Tournament)),
        round: text_cell(record, columns.index_of(Field::Round)),
        player1: text_cell(record, columns.index_of(Field::Player1)),
        player2: text_cell(record, columns.index_of(Field::Player2)),
        player1_prob: number_cell(record, columns.index_of(Field::Player1Prob)),
        player2_prob: number_cell(record, columns.index_of(Field::Player2Prob)),
        player1_odds: number_cell(record, columns.index_of(Field::Player1Odds)),
        player2_odds: number_cell(record, columns.index_of(Field::Player2Odds)),
    }
}

/// A probability of exactly 0 or 100 means the match is already decided.
fn open_probability(p: Option<f64>) -> bool {
    matches!(p, Some(v) if v > 0.0 && v < 100.0)
}

pub fn is_actionable(row: &MatchRow) -> bool {
    open_probability(row.player1_prob) && open_probability(row.player2_prob)
}

pub fn retain_actionable(rows: Vec<MatchRow>) -> Vec<MatchRow> {
    rows.into_iter().filter(is_actionable).collect()
}

pub fn format_probability(p: Option<f64>) -> String {
    match p {
        Some(v) => format!("{:.1}%", v),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn format_odds(odds: Option<f64>) -> String {
    match odds {
        Some(v) => format!("{:.2}", v),
        None => PLACEHOLDER.to_string(),
    }
}

fn format_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn format_row(row: &MatchRow) -> FormattedRow {
    FormattedRow {
        tournament: format_text(&row.tournament),
        round: format_text(&row.round),
        player1: format_text(&row.player1),
        player2: format_text(&row.player2),
        player1_prob: format_probability(row.player1_prob),
        player2_prob: format_probability(row.player2_prob),
        player1_odds: format_odds(row.player1_odds),
        player2_odds: format_odds(row.player2_odds),
    }
}

pub fn format_rows(rows: &[MatchRow]) -> Vec<FormattedRow> {
    rows.iter().map(format_row).collect()
}

/// Stable ascending sort by tournament, then round, as plain text.
///
/// Rounds compare lexicographically ("F" < "QF" < "R16" < "SF"), not by
/// stage of the competition.
pub fn sort_rows(rows: &mut [FormattedRow]) {
    rows.sort_by(|a, b| {
        (a.tournament.as_str(), a.round.as_str()).cmp(&(b.tournament.as_str(), b.round.as_str()))
    });
}

/// Load, filter, format and sort one snapshot.
pub fn prepare_rows(path: &Path, schema: &DisplaySchema) -> Result<PreparedRows> {
    let _scope = ProfileScope::new("prepare_rows");
    let loaded = load_rows(path, schema)?;
    debug(
        Domain::Load,
        "snapshot_digest",
        obj(&[
            ("path", v_str(&loaded.path.display().to_string())),
            ("sha256", v_str(&loaded.sha256)),
        ]),
    );

    let rows_read = loaded.rows.len();
    info(
        Domain::Load,
        "rows_read",
        obj(&[
            ("path", v_str(&loaded.path.display().to_string())),
            ("rows", v_num(rows_read as f64)),
        ]),
    );

    let retained = retain_actionable(loaded.rows);
    let rows_retained = retained.len();
    info(
        Domain::Filter,
        "rows_filtered",
        obj(&[
            ("msg", v_str("dropped rows with probability 0, 100 or missing")),
            ("dropped", v_num((rows_read - rows_retained) as f64)),
            ("retained", v_num(rows_retained as f64)),
        ]),
    );
    if retained.is_empty() {
        return Err(ReportError::NoActionableRows { rows_read });
    }

    let mut rows = format_rows(&retained);
    sort_rows(&mut rows);
    Ok(PreparedRows {
        rows,
        rows_read,
        rows_retained,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tournament: &str, round: &str, p1: Option<f64>, p2: Option<f64>) -> MatchRow {
        MatchRow {
            tournament: Some(tournament.to_string()),
            round: Some(round.to_string()),
            player1: Some("Alcaraz".to_string()),
            player2: Some("Sinner".to_string()),
            player1_prob: p1,
            player2_prob: p2,
            player1_odds: Some(1.8),
            player2_odds: Some(2.25),
        }
    }

    #[test]
    fn coerce_handles_text_and_blanks() {
        assert_eq!(coerce_number("45.5"), Some(45.5));
        assert_eq!(coerce_number(" 12 "), Some(12.0));
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("n/a"), None);
        assert_eq!(coerce_number("NaN"), None);
        assert_eq!(coerce_number("inf"), None);
        assert_eq!(coerce_number("fifty"), None);
        assert_eq!(coerce_number("#N/A"), None);
        assert_eq!(coerce_number("-nan"), None);
    }

    #[test]
    fn actionable_bounds_are_exclusive() {
        assert!(is_actionable(&row("T", "R1", Some(0.1), Some(99.9))));
        assert!(!is_actionable(&row("T", "R1", Some(0.0), Some(50.0))));
        assert!(!is_actionable(&row("T", "R1", Some(50.0), Some(100.0))));
        assert!(!is_actionable(&row("T", "R1", None, Some(50.0))));
        assert!(!is_actionable(&row("T", "R1", Some(-3.0), Some(50.0))));
        assert!(!is_actionable(&row("T", "R1", Some(50.0), Some(120.0))));
    }

    #[test]
    fn filtering_is_idempotent() {
        let rows = vec![
            row("A", "R1", Some(0.0), Some(50.0)),
            row("A", "R2", Some(100.0), Some(0.0)),
            row("B", "QF", Some(45.5), Some(54.5)),
            row("C", "SF", None, Some(30.0)),
            row("D", "F", Some(70.0), Some(30.0)),
        ];
        let once = retain_actionable(rows);
        let twice = retain_actionable(once.clone());
        assert_eq!(once.len(), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn display_formats() {
        assert_eq!(format_probability(Some(45.5)), "45.5%");
        assert_eq!(format_probability(Some(12.345)), "12.3%");
        assert_eq!(format_probability(Some(60.0)), "60.0%");
        assert_eq!(format_probability(None), "-");
        assert_eq!(format_odds(Some(2.0)), "2.00");
        assert_eq!(format_odds(Some(1.836)), "1.84");
        assert_eq!(format_odds(None), "-");
    }

    #[test]
    fn missing_text_renders_placeholder() {
        let mut r = row("Rome", "R32", Some(40.0), Some(60.0));
        r.player2 = None;
        r.player1_odds = None;
        let f = format_row(&r);
        assert_eq!(f.player2, "-");
        assert_eq!(f.player1_odds, "-");
        assert_eq!(f.player2_odds, "2.25");
    }

    #[test]
    fn sort_is_plain_text_by_tournament_then_round() {
        let mut rows = format_rows(&[
            row("Madrid", "SF", Some(50.0), Some(50.0)),
            row("Madrid", "QF", Some(50.0), Some(50.0)),
            row("Barcelona", "R16", Some(50.0), Some(50.0)),
            row("Madrid", "F", Some(50.0), Some(50.0)),
        ]);
        sort_rows(&mut rows);
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.tournament.as_str(), r.round.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("Barcelona", "R16"), ("Madrid", "F"), ("Madrid", "QF"), ("Madrid", "SF")]
        );
    }

    #[test]
    fn sort_keeps_input_order_for_equal_keys() {
        let mut a = row("Lyon", "R1", Some(50.0), Some(50.0));
        a.player1 = Some("first".into());
        let mut b = row("Lyon", "R1", Some(50.0), Some(50.0));
        b.player1 = Some("second".into());
        let mut rows = format_rows(&[a, b]);
        sort_rows(&mut rows);
        assert_eq!(rows[0].player1, "first");
        assert_eq!(rows[1].player1, "second");
    }
}
