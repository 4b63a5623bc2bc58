// src/report/html.rs

use anyhow::{Context, Result};
use arrow::{array::Array, record_batch::RecordBatch, util::display::array_value_to_string};
use std::fmt::Write;

use super::{PageDescriptor, PageLayout};
use crate::process::frame::text_column;

/// Class id the sortable-table script looks for.
pub const SORTER_ID: &str = "sorter_class";

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `<table>` markup for the given rows of `batch`, restricted to the
/// requested columns that exist.
fn table(batch: &RecordBatch, columns: &[&str], rows: &[usize]) -> Result<String> {
    let present: Vec<(&str, usize)> = columns
        .iter()
        .filter_map(|c| batch.schema().index_of(c).ok().map(|i| (*c, i)))
        .collect();

    let mut html = String::new();
    writeln!(html, r#"<table id="{}" class="table table-bordered">"#, SORTER_ID)?;
    html.push_str("<thead><tr>");
    for (name, _) in &present {
        write!(html, "<th>{}</th>", escape(name))?;
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for &row in rows {
        html.push_str("<tr>");
        for (name, i) in &present {
            let col = batch.column(*i);
            let cell = if col.is_null(row) {
                String::new()
            } else {
                array_value_to_string(col.as_ref(), row)
                    .with_context(|| format!("formatting `{}` row {}", name, row))?
            };
            write!(html, "<td>{}</td>", escape(&cell))?;
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    Ok(html)
}

/// Row indices grouped by position label, groups in label order; rows with
/// no position come last.
fn by_position(batch: &RecordBatch) -> Vec<(String, Vec<usize>)> {
    let mut groups: std::collections::BTreeMap<String, Vec<usize>> = Default::default();
    let mut unknown = Vec::new();
    match text_column(batch, "Pos") {
        Some(pos) => {
            for (i, p) in pos.iter().enumerate() {
                match p {
                    Some(p) => groups.entry(p.to_string()).or_default().push(i),
                    None => unknown.push(i),
                }
            }
        }
        None => unknown.extend(0..batch.num_rows()),
    }
    let mut out: Vec<_> = groups.into_iter().collect();
    if !unknown.is_empty() {
        out.push(("Unknown".to_string(), unknown));
    }
    out
}

/// A complete page for one season.
pub fn render_page(page: &PageDescriptor, year: i32, batch: &RecordBatch) -> Result<String> {
    let title = format!("{} {}", page.title, year);
    let mut html = String::new();
    writeln!(html, "<!DOCTYPE html>\n<html>\n<head>")?;
    writeln!(html, r#"<meta charset="utf-8">"#)?;
    writeln!(html, "<title>{}</title>\n</head>\n<body>", escape(&title))?;
    writeln!(html, r#"<p><a href="../toc.html">Table of Contents</a></p>"#)?;
    writeln!(html, "<h1>{}</h1>", escape(&title))?;
    writeln!(html, r#"<div id="{}">"#, escape(page.table_id))?;

    match page.layout {
        PageLayout::Plain => {
            let rows: Vec<usize> = (0..batch.num_rows()).collect();
            html.push_str(&table(batch, page.columns, &rows)?);
        }
        PageLayout::ByPosition => {
            for (pos, rows) in by_position(batch) {
                writeln!(html, "<h2>{}</h2>", escape(&pos))?;
                html.push_str(&table(batch, page.columns, &rows)?);
            }
        }
    }

    writeln!(html, "</div>\n</body>\n</html>")?;
    Ok(html)
}

/// Links to every rendered page, newest season first.
pub fn render_toc(entries: &[(i32, &PageDescriptor)]) -> Result<String> {
    let mut html = String::new();
    writeln!(html, "<!DOCTYPE html>\n<html>\n<head>")?;
    writeln!(html, r#"<meta charset="utf-8">"#)?;
    writeln!(html, "<title>Table of Contents</title>\n</head>\n<body>")?;
    writeln!(html, "<h1>Table of Contents</h1>\n<ul>")?;
    let mut sorted: Vec<_> = entries.to_vec();
    sorted.sort_by(|a, b| b.0.cmp(&a.0));
    for (year, page) in sorted {
        writeln!(
            html,
            r#"<li><a href="{}/{}">{} {}</a></li>"#,
            year,
            page.href,
            escape(page.title),
            year
        )?;
    }
    writeln!(html, "</ul>\n</body>\n</html>")?;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::test_support::players;
    use crate::report::PageSource;

    const PAGE: PageDescriptor = PageDescriptor {
        title: "Test",
        href: "test.html",
        table_id: "test",
        source: PageSource::Players,
        columns: &["Player", "PTS", "Nope"],
        layout: PageLayout::Plain,
    };

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn renders_present_columns_only() {
        let b = players(&["A&B", "C"], &[("PTS", &[25.5, 3.0])]);
        let html = render_page(&PAGE, 2015, &b).unwrap();
        assert!(html.contains(r#"<table id="sorter_class" class="table table-bordered">"#));
        assert!(html.contains("<th>Player</th><th>PTS</th></tr>"));
        assert!(!html.contains("Nope"));
        assert!(html.contains("<td>A&amp;B</td><td>25.5</td>"));
        assert!(html.contains("<title>Test 2015</title>"));
    }

    #[test]
    fn position_layout_groups_rows() {
        let b = players(&["A", "B"], &[("PTS", &[1.0, 2.0])]);
        let page = PageDescriptor {
            layout: PageLayout::ByPosition,
            ..PAGE
        };
        // no Pos column: everything lands under one heading
        let html = render_page(&page, 2015, &b).unwrap();
        assert_eq!(html.matches("<h2>").count(), 1);
        assert!(html.contains("<h2>Unknown</h2>"));
    }

    #[test]
    fn toc_links_newest_first() {
        let html = render_toc(&[(2014, &PAGE), (2015, &PAGE)]).unwrap();
        let a = html.find(r#"href="2015/test.html""#).unwrap();
        let b = html.find(r#"href="2014/test.html""#).unwrap();
        assert!(a < b);
    }
}
