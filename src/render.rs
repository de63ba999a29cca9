use std::fmt::Write as _;

use crate::error::{ReportError, Result};
use crate::logging::{log_error_chain, obj, v_str, warn, Domain, Level};
use crate::projector::{DisplaySchema, PresentationRow};

pub const ERROR_MESSAGE_CLASS: &str = "error-message";
pub const TABLE_CLASS: &str = "dataframe";

/// Escapes text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn render_table(schema: &DisplaySchema, rows: &[PresentationRow]) -> Result<String> {
    let mut out = String::new();
    write_table(&mut out, schema, rows).map_err(|e| ReportError::RenderFailure {
        detail: e.to_string(),
    })?;
    Ok(out)
}

fn write_table(
    out: &mut String,
    schema: &DisplaySchema,
    rows: &[PresentationRow],
) -> std::fmt::Result {
    writeln!(out, "<table border=\"0\" class=\"{}\">", TABLE_CLASS)?;
    writeln!(out, "  <thead>")?;
    writeln!(out, "    <tr style=\"text-align: right;\">")?;
    for header in schema.headers() {
        writeln!(out, "      <th>{}</th>", escape_html(header))?;
    }
    writeln!(out, "    </tr>")?;
    writeln!(out, "  </thead>")?;
    writeln!(out, "  <tbody>")?;
    for row in rows {
        writeln!(out, "    <tr>")?;
        for cell in &row.cells {
            writeln!(out, "      <td>{}</td>", escape_html(cell))?;
        }
        writeln!(out, "    </tr>")?;
    }
    writeln!(out, "  </tbody>")?;
    write!(out, "</table>")
}

/// The block shown in place of the table when a stage failed.
pub fn error_fragment(err: &ReportError) -> String {
    log_error_chain(Level::Error, Domain::Render, err.kind(), err);
    if let Some(detail) = err.detail() {
        warn(Domain::Render, "error_detail", obj(&[("msg", v_str(detail))]));
    }
    format!(
        "<div class=\"{}\" style=\"padding: 20px;\">{} Check logs for details.</div>",
        ERROR_MESSAGE_CLASS,
        escape_html(&err.to_string())
    )
}

/// Table or error fragment for whatever the earlier stages produced.
pub fn render_fragment(
    schema: &DisplaySchema,
    rows: std::result::Result<Vec<PresentationRow>, ReportError>,
) -> String {
    let rendered = rows.and_then(|rows| render_table(schema, &rows));
    match rendered {
        Ok(table) if !table.trim().is_empty() => table,
        Ok(_) => error_fragment(&ReportError::RenderFailure {
            detail: "table markup was empty".to_string(),
        }),
        Err(err) => error_fragment(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn one_row() -> Vec<PresentationRow> {
        vec![PresentationRow {
            cells: ["Queen's", "R1", "<b>A</b>", "B & C", "45.5%", "54.5%", "2.20", "1.83"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }]
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
    }

    #[test]
    fn table_has_header_and_escaped_cells() {
        let html = render_table(&DisplaySchema::default(), &one_row()).unwrap();
        assert!(html.starts_with("<table border=\"0\" class=\"dataframe\">"));
        assert!(html.ends_with("</table>"));
        assert!(html.contains("<th>Player 1</th>"));
        assert!(html.contains("<th>P2 Odds</th>"));
        assert!(html.contains("<td>Queen&#x27;s</td>"));
        assert!(html.contains("<td>&lt;b&gt;A&lt;/b&gt;</td>"));
        assert!(html.contains("<td>B &amp; C</td>"));
        assert_eq!(html.matches("<th>").count(), 8);
        assert_eq!(html.matches("<td>").count(), 8);
    }

    #[test]
    fn every_error_renders_a_distinct_fragment() {
        let path = PathBuf::from("data_archive/sackmann_matchups_1.csv");
        let errors = vec![
            ReportError::SnapshotNotFound {
                pattern: "sackmann_matchups_*.csv".into(),
                dir: "data_archive".into(),
            },
            ReportError::FileNotFound { path: path.clone() },
            ReportError::EmptyData {
                path: path.clone(),
                cause: crate::error::EmptyCause::ZeroBytes,
            },
            ReportError::NoActionableRows { rows_read: 2 },
            ReportError::MissingColumns {
                missing: vec!["Round".into()],
            },
            ReportError::RenderFailure {
                detail: "fmt".into(),
            },
        ];
        let fragments: Vec<String> = errors
            .into_iter()
            .map(|e| render_fragment(&DisplaySchema::default(), Err(e)))
            .collect();
        for (i, a) in fragments.iter().enumerate() {
            assert!(a.starts_with("<div class=\"error-message\" style=\"padding: 20px;\">"));
            assert!(a.ends_with(" Check logs for details.</div>"));
            for b in fragments.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert!(fragments[0].contains("(sackmann_matchups_*.csv)"));
    }

    #[test]
    fn empty_row_set_still_renders_table() {
        let html = render_fragment(&DisplaySchema::default(), Ok(Vec::new()));
        assert!(html.contains("<thead>"));
        assert!(!html.contains("<td>"));
    }
}
