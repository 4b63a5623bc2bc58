// src/process/merge.rs
//
// One row per player per season out of four independently stacked tables.

use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, StringArray, UInt32Array},
    compute::take,
    datatypes::{Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tracing::{debug, info, instrument};

use super::frame::{drop_columns, require_text, take_rows};
use crate::schema::tables::{PLAYER, YEAR};

/// Resolves rows that share a player name within one source table
/// (mid-season trades put the same player on two teams).
pub trait DuplicatePolicy {
    fn resolve(&self, batch: &RecordBatch, key: &str) -> Result<RecordBatch>;
}

/// Keep only the last row per name, in table order. Stats from earlier
/// teams are discarded, not combined. Rows without a name are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepLast;

impl DuplicatePolicy for KeepLast {
    fn resolve(&self, batch: &RecordBatch, key: &str) -> Result<RecordBatch> {
        let names = require_text(batch, key)?;
        let mut last: HashMap<&str, usize> = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if let Some(n) = name {
                last.insert(n, i);
            }
        }
        let keep: UInt32Array = names
            .iter()
            .enumerate()
            .filter(|(i, n)| n.is_some_and(|n| last.get(n) == Some(i)))
            .map(|(i, _)| i as u32)
            .collect();
        if keep.len() < batch.num_rows() {
            debug!(dropped = batch.num_rows() - keep.len(), "resolved duplicate names");
        }
        take_rows(batch, &keep)
    }
}

/// Full outer join on the text column `key`.
///
/// Output rows are ordered by key. Non-key columns of `right` whose names
/// already exist on the left get a `_{right_label}` suffix.
pub fn outer_join(
    left: &RecordBatch,
    right: &RecordBatch,
    key: &str,
    right_label: &str,
) -> Result<RecordBatch> {
    let lkeys = require_text(left, key)?;
    let rkeys = require_text(right, key)?;

    let mut joined: BTreeMap<&str, (Option<u32>, Option<u32>)> = BTreeMap::new();
    for (i, k) in lkeys.iter().enumerate() {
        if let Some(k) = k {
            joined.entry(k).or_default().0 = Some(i as u32);
        }
    }
    for (i, k) in rkeys.iter().enumerate() {
        if let Some(k) = k {
            joined.entry(k).or_default().1 = Some(i as u32);
        }
    }

    let keys: StringArray = joined.keys().map(|k| Some(*k)).collect();
    let lidx: UInt32Array = joined.values().map(|(l, _)| *l).collect();
    let ridx: UInt32Array = joined.values().map(|(_, r)| *r).collect();

    let mut fields = vec![Field::new(key, arrow::datatypes::DataType::Utf8, true)];
    let mut cols: Vec<ArrayRef> = vec![Arc::new(keys)];

    let lschema = left.schema();
    for (f, c) in lschema.fields().iter().zip(left.columns()) {
        if f.name() == key {
            continue;
        }
        fields.push(Field::new(f.name(), f.data_type().clone(), true));
        cols.push(take(c.as_ref(), &lidx, None).context("gathering left rows")?);
    }
    let rschema = right.schema();
    for (f, c) in rschema.fields().iter().zip(right.columns()) {
        if f.name() == key {
            continue;
        }
        let name = if lschema.index_of(f.name()).is_ok() {
            debug!(column = %f.name(), suffix = right_label, "column name collision");
            format!("{}_{}", f.name(), right_label)
        } else {
            f.name().clone()
        };
        fields.push(Field::new(name, f.data_type().clone(), true));
        cols.push(take(c.as_ref(), &ridx, None).context("gathering right rows")?);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols).context("assembling joined batch")
}

/// Left join on the text column `key`: every left row is kept, in order,
/// with the matching right row's other columns appended (null when absent).
/// `right` must already be unique by key.
pub fn left_join(left: &RecordBatch, right: &RecordBatch, key: &str) -> Result<RecordBatch> {
    let lkeys = require_text(left, key)?;
    let rkeys = require_text(right, key)?;

    let index: HashMap<&str, u32> = rkeys
        .iter()
        .enumerate()
        .filter_map(|(i, k)| k.map(|k| (k, i as u32)))
        .collect();
    let ridx: UInt32Array = lkeys
        .iter()
        .map(|k| k.and_then(|k| index.get(k).copied()))
        .collect();

    let lschema = left.schema();
    let mut fields: Vec<Field> = lschema
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    let mut cols: Vec<ArrayRef> = left.columns().to_vec();
    let rschema = right.schema();
    for (f, c) in rschema.fields().iter().zip(right.columns()) {
        if f.name() == key || lschema.index_of(f.name()).is_ok() {
            continue;
        }
        fields.push(Field::new(f.name(), f.data_type().clone(), true));
        cols.push(take(c.as_ref(), &ridx, None).context("gathering right rows")?);
    }

    let schema = Schema::new_with_metadata(fields, lschema.metadata().clone());
    RecordBatch::try_new(Arc::new(schema), cols).context("assembling joined batch")
}

/// Reconciles the roster, per-game, salary and advanced tables of a season.
pub struct PlayerMerger {
    policy: Box<dyn DuplicatePolicy>,
}

impl Default for PlayerMerger {
    fn default() -> Self {
        Self::new(Box::new(KeepLast))
    }
}

impl PlayerMerger {
    pub fn new(policy: Box<dyn DuplicatePolicy>) -> Self {
        Self { policy }
    }

    /// Dedupe each table by player, then outer-join
    /// roster → per-game → salary → advanced on the player name.
    /// Per-table `year` tags are dropped; the caller reattaches the season.
    #[instrument(level = "info", skip_all)]
    pub fn merge(
        &self,
        roster: &RecordBatch,
        per_game: &RecordBatch,
        salary: &RecordBatch,
        advanced: &RecordBatch,
    ) -> Result<RecordBatch> {
        let prepared = [
            ("roster", roster),
            ("per_game", per_game),
            ("salaries", salary),
            ("advanced", advanced),
        ]
        .into_iter()
        .map(|(label, t)| {
            let t = drop_columns(t, &[YEAR])?;
            let t = self
                .policy
                .resolve(&t, PLAYER)
                .with_context(|| format!("resolving duplicates in {}", label))?;
            Ok((label, t))
        })
        .collect::<Result<Vec<_>>>()?;

        let mut iter = prepared.into_iter();
        let (_, mut merged) = iter.next().context("no tables to merge")?;
        for (label, table) in iter {
            merged = outer_join(&merged, &table, PLAYER, label)
                .with_context(|| format!("joining {}", label))?;
        }
        info!(players = merged.num_rows(), "merged");
        Ok(merged)
    }
}
