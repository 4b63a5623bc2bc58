// src/extract/mod.rs
//
// Pulls one `<table id=...>` out of a saved HTML page as a rectangle of
// strings. No typing happens here; see `process::load`.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace, warn};

static ROWS: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("static selector"));
static BODY_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody > tr").expect("static selector"));
static HEAD_ROWS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead tr").expect("static selector"));
static CELLS: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").expect("static selector"));

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawTable {
    /// Cell text of the last header row, if the table had a `thead`.
    /// Informational only: callers assign names by position.
    pub headers: Vec<String>,
    /// Data rows, padded so every row has the same width.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Find `table#table_id` in `html` and return its data rows.
///
/// Rows carrying a non-empty `class` attribute are interstitial header or
/// section rows in the source markup and are skipped. If the table is not
/// part of the live DOM, commented-out markup is searched as well.
///
/// Returns `None` when no such table exists.
pub fn extract_table(html: &str, table_id: &str) -> Option<RawTable> {
    let sel = match Selector::parse(&format!(r#"table[id="{}"]"#, table_id)) {
        Ok(s) => s,
        Err(e) => {
            warn!(table_id, "invalid table id selector: {:?}", e);
            return None;
        }
    };

    let doc = Html::parse_document(html);
    if let Some(table) = doc.select(&sel).next() {
        return Some(read_table(table));
    }

    // some pages ship secondary tables inside HTML comments
    let needle = format!(r#"id="{}""#, table_id);
    for node in doc.root_element().descendants() {
        let Some(comment) = node.value().as_comment() else {
            continue;
        };
        let body: &str = &**comment;
        if !body.contains(&needle) {
            continue;
        }
        let fragment = Html::parse_fragment(body);
        if let Some(table) = fragment.select(&sel).next() {
            debug!(table_id, "recovered table from commented markup");
            return Some(read_table(table));
        }
    }

    None
}

fn read_table(table: ElementRef<'_>) -> RawTable {
    let headers = table
        .select(&HEAD_ROWS)
        .last()
        .map(|tr| tr.select(&CELLS).map(cell_text).collect())
        .unwrap_or_default();

    let mut body: Vec<ElementRef<'_>> = table.select(&BODY_ROWS).collect();
    if body.is_empty() {
        // no tbody in the markup: take every row outside thead
        body = table
            .select(&ROWS)
            .filter(|tr| {
                !tr.ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|a| a.value().name() == "thead")
            })
            .collect();
    }

    let mut rows: Vec<Vec<String>> = body
        .into_iter()
        .filter(|tr| {
            let keep = tr.value().attr("class").map_or(true, |c| c.trim().is_empty());
            if !keep {
                trace!(class = ?tr.value().attr("class"), "skipping non-data row");
            }
            keep
        })
        .map(|tr| tr.select(&CELLS).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(width, String::new());
    }

    RawTable { headers, rows }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let text: String = cell.text().collect();
    text.replace('\u{a0}', " ").trim().to_string()
}
