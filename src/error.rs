//! Error types for the report pipeline.
//!
//! Every failure is fatal: the pipeline is a one-shot batch job and
//! surfaces the first error directly to the caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    #[error("Empty group: no {group} respondents for barrier \"{barrier}\"")]
    EmptyGroup { barrier: String, group: String },

    #[error("Column not found in dataset: {column}")]
    MissingColumn { column: String },

    #[error("Dataset has {found} rows but at least {expected} header rows are required")]
    InsufficientRows { expected: usize, found: usize },

    #[error("Barrier id \"{id}\" is defined more than once")]
    DuplicateBarrier { id: String },

    #[error("No barrier indicators configured")]
    NoIndicators,

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    pub(crate) fn malformed(row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            row,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_group_names_barrier_and_group() {
        let err = ReportError::EmptyGroup {
            barrier: "Exam cost".to_string(),
            group: "Graduate".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("Exam cost"));
        assert!(message.contains("Graduate"));
    }

    #[test]
    fn test_malformed_helper() {
        let err = ReportError::malformed(7, "missing group label");
        assert!(matches!(err, ReportError::MalformedRecord { row: 7, .. }));
        assert_eq!(
            err.to_string(),
            "Malformed record at row 7: missing group label"
        );
    }
}
