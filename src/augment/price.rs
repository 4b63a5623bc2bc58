// src/augment/price.rs

use anyhow::Result;
use arrow::{array::Float64Array, record_batch::RecordBatch};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::value::VALUE;
use super::{check_ready, mark, Stage};
use crate::config::LeagueSettings;
use crate::process::frame::{f64_values, with_column};

pub const PRICE: &str = "price";

/// Auction prices for a list of value scores, in input order.
///
/// The top `draftable` players each get the minimum bid plus a share of the
/// league's spare money proportional to how far they sit above the last
/// drafted player. Everyone else is worth 0.
pub fn auction_prices(values: &[f64], league: &LeagueSettings) -> Vec<f64> {
    let n = league.draftable().min(values.len());
    if n == 0 {
        return vec![0.0; values.len()];
    }

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    let drafted = &order[..n];
    let replacement = values[order[n - 1]];

    let surplus: f64 = drafted.iter().map(|&i| values[i] - replacement).sum();
    let spare = (league.teams as f64 * league.budget - n as f64 * league.min_bid).max(0.0);
    debug!(drafted = n, replacement, surplus, spare, "auction pool");

    let mut prices = vec![0.0; values.len()];
    for &i in drafted {
        let share = if surplus > 0.0 {
            spare * (values[i] - replacement) / surplus
        } else {
            spare / n as f64
        };
        prices[i] = league.min_bid + share;
    }
    prices
}

/// Add the `price` column from `value`. Requires the value stage.
#[instrument(level = "info", skip_all, fields(rows = batch.num_rows()))]
pub fn augment_price(batch: RecordBatch, league: &LeagueSettings) -> Result<RecordBatch> {
    check_ready(&batch, Stage::Price)?;
    let prices = auction_prices(&f64_values(&batch, VALUE)?, league);
    let out = with_column(&batch, PRICE, Arc::new(Float64Array::from(prices)))?;
    mark(out, Stage::Price)
}
