// src/process/mod.rs
//
// Raw page tables → typed season tables → one merged row per player.

pub mod convert;
pub mod frame;
pub mod load;
pub mod merge;
pub mod season;
pub mod utils;

pub use load::{Layout, LoadFailure, LoadReport, TableLoader};
pub use merge::{DuplicatePolicy, KeepLast, PlayerMerger};
pub use season::SeasonAggregator;
