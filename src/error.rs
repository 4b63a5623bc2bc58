// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failures a caller needs to tell apart. Everything else travels as a plain
/// `anyhow::Error` with context attached.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Not a single team document exists for the season.
    #[error("could not find raw data in {}", dir.display())]
    NoRawData { dir: PathBuf },

    /// One or more documents existed but their tables could not be read.
    #[error("{count} source document(s) could not be parsed for {year}; first: {}", first.display())]
    SourceUnreadable {
        year: i32,
        count: usize,
        first: PathBuf,
    },

    /// An advanced-stats table whose pruned width matches no known layout.
    #[error("advanced table in {} has {columns} non-empty columns (expected 24 or 25)", path.display())]
    UnknownAdvancedShape { path: PathBuf, columns: usize },

    /// An augmentation stage was applied before one it depends on.
    #[error("stage `{stage}` requires `{missing}` to run first")]
    StageOrder {
        stage: &'static str,
        missing: &'static str,
    },

    #[error("table has no column `{0}`")]
    MissingColumn(String),
}

impl PipelineError {
    /// Process exit status for a failed run: 2 when the season has no raw
    /// data, 3 when source documents could not be parsed, 1 otherwise.
    pub fn exit_code(err: &anyhow::Error) -> u8 {
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::NoRawData { .. }) => 2,
            Some(PipelineError::SourceUnreadable { .. }) => 3,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn fail_with(e: PipelineError) -> anyhow::Result<()> {
        Err(e).context("processing season 2015")
    }

    #[test]
    fn exit_codes_tell_failures_apart() {
        let no_data = fail_with(PipelineError::NoRawData {
            dir: PathBuf::from("raw_data/teams/2015"),
        })
        .unwrap_err();
        assert_eq!(PipelineError::exit_code(&no_data), 2);

        let unreadable = fail_with(PipelineError::SourceUnreadable {
            year: 2015,
            count: 2,
            first: PathBuf::from("raw_data/teams/2015/AAA.html"),
        })
        .unwrap_err();
        assert_eq!(PipelineError::exit_code(&unreadable), 3);
        assert_eq!(
            PipelineError::exit_code(&PipelineError::MissingColumn("PTS".into()).into()),
            1
        );
        assert_eq!(PipelineError::exit_code(&anyhow::anyhow!("disk full")), 1);
    }

    #[test]
    fn context_is_kept_in_the_message() {
        let err = fail_with(PipelineError::StageOrder {
            stage: "value",
            missing: "minutes",
        })
        .unwrap_err();
        assert_eq!(format!("{}", err), "processing season 2015");
        assert_eq!(
            format!("{:#}", err),
            "processing season 2015: stage `value` requires `minutes` to run first"
        );
    }
}
