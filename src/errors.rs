use thiserror::Error;

/// Errors raised at the write boundary of a [`RecordSet`](crate::collection::RecordSet).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("record is missing required field '{0}'")]
    MissingField(&'static str),
    #[error("no record at position {index} (collection has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
