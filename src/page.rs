use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

use crate::error::{ReportError, Result};
use crate::logging::{info, obj, v_num, v_str, Domain};
use crate::render::{escape_html, ERROR_MESSAGE_CLASS, TABLE_CLASS};

pub const PAGE_TITLE: &str = "Upcoming Tennis Odds (Sackmann Model)";
pub const PAGE_HEADING: &str = "Upcoming Tennis Match Odds (Sackmann Model)";
pub const PAGE_INTRO: &str = "This page displays probabilities and calculated decimal odds for upcoming ATP and Challenger matches based on the Tennis Abstract Sackmann model ratings.";

const STYLE: &str = r#"
        :root {
            --primary-color: #0056b3;
            --secondary-color: #007bff;
            --light-gray: #f8f9fa;
            --medium-gray: #dee2e6;
            --dark-gray: #343a40;
            --white: #ffffff;
            --hover-color: #e9ecef;
            --shadow-color: rgba(0,0,0,0.06);
        }
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
            line-height: 1.65;
            padding: 25px;
            max-width: 1050px;
            margin: 25px auto;
            background-color: var(--light-gray);
            color: var(--dark-gray);
        }
        h1 {
            color: var(--primary-color);
            border-bottom: 3px solid var(--primary-color);
            padding-bottom: 12px;
            margin-bottom: 30px;
            font-weight: 600;
        }
        p { margin-bottom: 20px; }
        .table-container {
            overflow-x: auto;
            box-shadow: 0 4px 10px var(--shadow-color);
            border-radius: 6px;
            background-color: var(--white);
            border: 1px solid var(--medium-gray);
            min-height: 100px;
            margin-bottom: 20px;
        }
        table.@TABLE@ { width: 100%; border-collapse: collapse; margin: 0; }
        table.@TABLE@ th, table.@TABLE@ td {
            border: none;
            border-bottom: 1px solid var(--medium-gray);
            padding: 12px 14px;
            text-align: left;
            vertical-align: middle;
            white-space: nowrap;
        }
        table.@TABLE@ tbody tr:last-child td { border-bottom: none; }
        /* Tournament, Round, Player 1, Player 2, P1 Prob, P2 Prob, P1 Odds, P2 Odds */
        table.@TABLE@ th:nth-child(1), table.@TABLE@ td:nth-child(1) { width: 15%; white-space: normal; }
        table.@TABLE@ th:nth-child(2), table.@TABLE@ td:nth-child(2) { width: 8%; }
        table.@TABLE@ th:nth-child(3), table.@TABLE@ td:nth-child(3) { width: 20%; white-space: normal; font-weight: 500; }
        table.@TABLE@ th:nth-child(4), table.@TABLE@ td:nth-child(4) { width: 20%; white-space: normal; font-weight: 500; }
        table.@TABLE@ th:nth-child(5), table.@TABLE@ td:nth-child(5) { width: 9%; text-align: right; }
        table.@TABLE@ th:nth-child(6), table.@TABLE@ td:nth-child(6) { width: 9%; text-align: right; }
        table.@TABLE@ th:nth-child(7), table.@TABLE@ td:nth-child(7) { width: 9%; text-align: right; }
        table.@TABLE@ th:nth-child(8), table.@TABLE@ td:nth-child(8) { width: 10%; text-align: right; }
        table.@TABLE@ thead th {
            background-color: var(--secondary-color);
            color: var(--white);
            font-weight: 600;
            border-bottom: 2px solid var(--primary-color);
            white-space: nowrap;
            position: sticky;
            top: 0;
            z-index: 1;
        }
        table.@TABLE@ tbody tr:nth-child(even) { background-color: var(--light-gray); }
        table.@TABLE@ tbody tr:hover { background-color: var(--hover-color); }
        .last-updated {
            margin-top: 30px;
            padding-top: 15px;
            border-top: 1px solid var(--medium-gray);
            font-size: 0.9em;
            color: #6c757d;
            text-align: center;
        }
        .@ERROR@ { color: #dc3545; font-weight: bold; text-align: center; }
        @media (max-width: 768px) {
            body { padding: 15px; }
            h1 { font-size: 1.5em; }
            table.@TABLE@ th, table.@TABLE@ td { white-space: normal; padding: 10px 8px; font-size: 0.9em; }
            table.@TABLE@ th:nth-child(3), table.@TABLE@ td:nth-child(3) { width: 25%; }
            table.@TABLE@ th:nth-child(4), table.@TABLE@ td:nth-child(4) { width: 25%; }
            table.@TABLE@ th:nth-child(1), table.@TABLE@ td:nth-child(1),
            table.@TABLE@ th:nth-child(2), table.@TABLE@ td:nth-child(2),
            table.@TABLE@ th:nth-child(5), table.@TABLE@ td:nth-child(5),
            table.@TABLE@ th:nth-child(6), table.@TABLE@ td:nth-child(6),
            table.@TABLE@ th:nth-child(7), table.@TABLE@ td:nth-child(7),
            table.@TABLE@ th:nth-child(8), table.@TABLE@ td:nth-child(8) { width: auto; }
        }
"#;

/// `YYYY-MM-DD HH:MM:SS UTC`
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn stylesheet() -> String {
    STYLE
        .replace("@TABLE@", TABLE_CLASS)
        .replace("@ERROR@", ERROR_MESSAGE_CLASS)
}

/// Full report document around one table-or-error fragment.
pub fn assemble_page(fragment: &str, timestamp: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}    </style>
</head>
<body>

    <h1>{heading}</h1>
    <p>{intro}</p>

    <div class="table-container">
        {fragment}
    </div>

    <div class="last-updated">
        Last updated: {timestamp}
    </div>

</body>
</html>
"#,
        title = escape_html(PAGE_TITLE),
        style = stylesheet(),
        heading = escape_html(PAGE_HEADING),
        intro = escape_html(PAGE_INTRO),
        fragment = fragment,
        timestamp = escape_html(timestamp),
    )
}

/// Replaces the report at `path`.
pub fn write_page(path: &Path, html: &str) -> Result<()> {
    fs::write(path, html).map_err(|source| ReportError::WriteFailure {
        path: path.to_path_buf(),
        source,
    })?;
    info(
        Domain::Page,
        "page_written",
        obj(&[
            ("path", v_str(&path.display().to_string())),
            ("bytes", v_num(html.len() as f64)),
        ]),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_layout() {
        let at = Utc.with_ymd_and_hms(2024, 6, 9, 7, 5, 3).unwrap();
        assert_eq!(format_timestamp(at), "2024-06-09 07:05:03 UTC");
    }

    #[test]
    fn page_embeds_fragment_once_with_chrome() {
        let fragment = "<div class=\"error-message\" style=\"padding: 20px;\">boom</div>";
        let page = assemble_page(fragment, "2024-06-09 07:05:03 UTC");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.trim_end().ends_with("</html>"));
        assert_eq!(page.matches(fragment).count(), 1);
        assert!(page.contains("<title>Upcoming Tennis Odds (Sackmann Model)</title>"));
        assert!(page.contains("<h1>Upcoming Tennis Match Odds (Sackmann Model)</h1>"));
        assert!(page.contains("Last updated: 2024-06-09 07:05:03 UTC"));
        assert!(page.contains("table.dataframe thead th"));
        assert!(page.contains(".error-message {"));
        assert!(!page.contains("@TABLE@"));
        assert!(!page.contains("@ERROR@"));
    }

    #[test]
    fn timestamp_text_is_escaped() {
        let page = assemble_page("<table></table>", "<now>");
        assert!(page.contains("Last updated: &lt;now&gt;"));
    }

    #[test]
    fn write_overwrites_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("index.html");
        fs::write(&path, "old content that is longer than the new one").unwrap();
        write_page(&path, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn write_into_missing_dir_is_fatal() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("index.html");
        let err = write_page(&path, "<html></html>").unwrap_err();
        assert!(err.is_fatal());
        assert!(std::error::Error::source(&err).is_some());
    }
}
