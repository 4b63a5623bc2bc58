pub mod augment;
pub mod config;
pub mod error;
pub mod extract;
pub mod fantasy;
pub mod process;
pub mod report;
pub mod run;
pub mod schema;
pub mod store;

pub use error::PipelineError;
