// src/augment/draft.rs

use anyhow::{Context, Result};
use arrow::{
    array::ArrayRef,
    compute::concat_batches,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info, instrument, warn};

use super::{mark, Stage};
use crate::config::DataLayout;
use crate::process::frame::{constant_int, require_text};
use crate::process::merge::left_join;
use crate::process::{DuplicatePolicy, KeepLast, Layout, TableLoader};
use crate::schema::tables::{DRAFT, PLAYER};

pub const DRAFT_PICK: &str = "Pk";
pub const DRAFT_TEAM: &str = "draft_team";
pub const DRAFT_YEAR: &str = "draft_year";

fn draft_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new(PLAYER, DataType::Utf8, true),
        Field::new(DRAFT_PICK, DataType::Int64, true),
        Field::new(DRAFT_TEAM, DataType::Utf8, true),
        Field::new(DRAFT_YEAR, DataType::Int64, true),
    ]))
}

/// Draft documents under `raw_data/draft/`, oldest class first.
fn draft_documents(layout: &DataLayout) -> Result<Vec<(i32, PathBuf)>> {
    let pattern = layout.draft_dir().join("*").join("draft.html");
    let pattern = pattern.to_string_lossy();
    let mut docs = Vec::new();
    for entry in glob::glob(&pattern).context("invalid draft glob")? {
        let path = entry.context("reading draft directory")?;
        let year = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .and_then(|n| n.parse::<i32>().ok());
        match year {
            Some(y) => docs.push((y, path)),
            None => warn!(path = %path.display(), "draft directory is not a year; skipping"),
        }
    }
    docs.sort();
    Ok(docs)
}

/// Pick, player and drafting team for one draft class.
fn draft_class(table: &RecordBatch, year: i32) -> Result<RecordBatch> {
    let rows = table.num_rows();
    let column = |name: &str| -> Result<ArrayRef> {
        table
            .column_by_name(name)
            .cloned()
            .with_context(|| format!("draft table has no `{}`", name))
    };
    require_text(table, PLAYER)?;
    RecordBatch::try_new(
        draft_schema(),
        vec![
            column(PLAYER)?,
            column(DRAFT_PICK)?,
            column("Tm")?,
            constant_int(year as i64, rows),
        ],
    )
    .context("building draft class")
}

/// Every saved draft class stacked, one row per player (a player who
/// appears in two classes keeps the later one). `None` when there are no
/// draft documents.
#[instrument(level = "info", skip_all)]
pub fn load_draft(layout: &DataLayout, loader: &mut TableLoader) -> Result<Option<RecordBatch>> {
    let docs = draft_documents(layout)?;
    if docs.is_empty() {
        debug!("no draft documents");
        return Ok(None);
    }

    let mut classes = Vec::with_capacity(docs.len());
    for (year, path) in &docs {
        let table = loader.load(path, Layout::Fixed(&DRAFT));
        classes.push(draft_class(&table, *year)?);
    }
    let stacked = concat_batches(&draft_schema(), &classes).context("stacking draft classes")?;
    let draft = KeepLast.resolve(&stacked, PLAYER)?;
    info!(classes = docs.len(), players = draft.num_rows(), "draft history loaded");
    Ok(Some(draft))
}

/// Attach draft pick, team and year to every player found in `draft`.
/// Undrafted players get nulls; no rows are added or removed.
#[instrument(level = "info", skip_all, fields(rows = batch.num_rows()))]
pub fn augment_draft_data(batch: RecordBatch, draft: &RecordBatch) -> Result<RecordBatch> {
    let out = left_join(&batch, draft, PLAYER)?;
    mark(out, Stage::Draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::{applied, test_support::players};
    use arrow::array::{Array, AsArray};
    use arrow::datatypes::Int64Type;
    use std::fs;

    fn draft_html(rows: &[(&str, &str, &str)]) -> String {
        let mut body = String::new();
        for (pk, tm, player) in rows {
            body.push_str(&format!(
                "<tr><th>1</th><td>{}</td><td>{}</td><td>{}</td><td>Duke</td>\
                 <td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>.5</td><td>.3</td>\
                 <td>.8</td><td>1</td><td>1</td><td>1</td><td>1</td><td>1</td><td>.1</td></tr>",
                pk, tm, player
            ));
        }
        format!(
            "<html><body><table id=\"stats\"><tbody>{}\
             <tr class=\"thead\"><th>Rk</th></tr></tbody></table></body></html>",
            body
        )
    }

    fn write_class(layout: &DataLayout, year: i32, rows: &[(&str, &str, &str)]) {
        let dir = layout.draft_dir().join(year.to_string());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("draft.html"), draft_html(rows)).unwrap();
    }

    #[test]
    fn no_documents_means_no_draft() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(tmp.path());
        assert!(load_draft(&layout, &mut TableLoader::new()).unwrap().is_none());
    }

    #[test]
    fn classes_stack_and_later_class_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(tmp.path());
        write_class(&layout, 2004, &[("1", "ORL", "Dwight Howard"), ("2", "CHA", "Emeka Okafor")]);
        write_class(&layout, 2003, &[("1", "CLE", "LeBron James"), ("5", "MIA", "Emeka Okafor")]);

        let mut loader = TableLoader::new();
        let draft = load_draft(&layout, &mut loader).unwrap().unwrap();
        assert_eq!(loader.report().loaded, 2);
        assert_eq!(draft.num_rows(), 3);

        let names = draft.column_by_name(PLAYER).unwrap().as_string::<i32>();
        let years = draft.column_by_name(DRAFT_YEAR).unwrap().as_primitive::<Int64Type>();
        let picks = draft.column_by_name(DRAFT_PICK).unwrap().as_primitive::<Int64Type>();
        let i = (0..names.len()).find(|&i| names.value(i) == "Emeka Okafor").unwrap();
        assert_eq!((years.value(i), picks.value(i)), (2004, 2));
    }

    #[test]
    fn augmentation_keeps_rows_and_marks_stage() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(tmp.path());
        write_class(&layout, 2003, &[("1", "CLE", "LeBron James")]);
        let draft = load_draft(&layout, &mut TableLoader::new()).unwrap().unwrap();

        let b = players(&["LeBron James", "Undrafted Guy"], &[("PTS", &[27.0, 3.0])]);
        let out = augment_draft_data(b, &draft).unwrap();
        assert_eq!(out.num_rows(), 2);
        assert_eq!(applied(&out), vec!["draft"]);
        let teams = out.column_by_name(DRAFT_TEAM).unwrap().as_string::<i32>();
        assert_eq!(teams.value(0), "CLE");
        assert!(teams.is_null(1));
    }
}
