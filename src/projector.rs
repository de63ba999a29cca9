//! Presentation schema: which snapshot columns are shown, in what order and
//! under which headers.

use crate::error::{ReportError, Result};
use crate::matchups::FormattedRow;

/// The eight snapshot fields every matchup row carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Tournament,
    Round,
    Player1,
    Player2,
    Player1Prob,
    Player2Prob,
    Player1Odds,
    Player2Odds,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Tournament,
        Field::Round,
        Field::Player1,
        Field::Player2,
        Field::Player1Prob,
        Field::Player2Prob,
        Field::Player1Odds,
        Field::Player2Odds,
    ];

    /// Column name in the snapshot CSV header.
    pub fn source_name(&self) -> &'static str {
        match self {
            Field::Tournament => "TournamentName",
            Field::Round => "Round",
            Field::Player1 => "Player1Name",
            Field::Player2 => "Player2Name",
            Field::Player1Prob => "Player1_Match_Prob",
            Field::Player2Prob => "Player2_Match_Prob",
            Field::Player1Odds => "Player1_Match_Odds",
            Field::Player2Odds => "Player2_Match_Odds",
        }
    }

    fn slot(&self) -> usize {
        match self {
            Field::Tournament => 0,
            Field::Round => 1,
            Field::Player1 => 2,
            Field::Player2 => 3,
            Field::Player1Prob => 4,
            Field::Player2Prob => 5,
            Field::Player1Odds => 6,
            Field::Player2Odds => 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayColumn {
    pub field: Field,
    pub header: String,
}

/// Ordered (field, header) pairs shown in the report table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySchema {
    columns: Vec<DisplayColumn>,
}

impl Default for DisplaySchema {
    fn default() -> Self {
        Self::new(vec![
            (Field::Tournament, "Tournament"),
            (Field::Round, "Round"),
            (Field::Player1, "Player 1"),
            (Field::Player2, "Player 2"),
            (Field::Player1Prob, "P1 Prob"),
            (Field::Player2Prob, "P2 Prob"),
            (Field::Player1Odds, "P1 Odds"),
            (Field::Player2Odds, "P2 Odds"),
        ])
    }
}

impl DisplaySchema {
    pub fn new(pairs: Vec<(Field, &str)>) -> Self {
        Self {
            columns: pairs
                .into_iter()
                .map(|(field, header)| DisplayColumn {
                    field,
                    header: header.to_string(),
                })
                .collect(),
        }
    }

    pub fn columns(&self) -> &[DisplayColumn] {
        &self.columns
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.header.as_str())
    }

    /// Maps every field to its position in `headers`.
    ///
    /// Any source column the schema needs that is absent from `headers`, and
    /// any field the schema itself leaves out, is reported in one
    /// `MissingColumns` error. Extra header columns are ignored.
    pub fn resolve_columns(&self, headers: &[String]) -> Result<ColumnMap> {
        let mut missing = Vec::new();
        let mut ordered: Vec<Field> = self.columns.iter().map(|c| c.field).collect();
        for field in Field::ALL {
            if !ordered.contains(&field) {
                ordered.push(field);
            }
        }

        let mut slots = [0usize; 8];
        for field in ordered {
            let name = field.source_name();
            let in_schema = self.columns.iter().any(|c| c.field == field);
            match headers.iter().position(|h| h.trim() == name) {
                Some(idx) if in_schema => slots[field.slot()] = idx,
                _ => missing.push(name.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(ColumnMap { slots })
        } else {
            Err(ReportError::MissingColumns { missing })
        }
    }
}

/// Header positions of the eight fields in one snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    slots: [usize; 8],
}

impl ColumnMap {
    pub fn index_of(&self, field: Field) -> usize {
        self.slots[field.slot()]
    }
}

/// One table row: display text per schema column, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationRow {
    pub cells: Vec<String>,
}

pub fn project(schema: &DisplaySchema, rows: &[FormattedRow]) -> Vec<PresentationRow> {
    rows.iter()
        .map(|row| PresentationRow {
            cells: schema
                .columns()
                .iter()
                .map(|c| row.get(c.field).to_string())
                .collect(),
        })
        .collect()
}
