use thiserror::Error;

/// Contract violations reported at the boundary of the store.
///
/// Out-of-range reads never produce one of these: they return
/// [`MISSING`](crate::data_types::MISSING) instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown dimension `{0}`")]
    UnknownDimension(String),

    #[error("dimension `{0}` is declared more than once")]
    DuplicateDimension(String),

    #[error("too many dimensions: {count} (limit {limit})")]
    TooManyDimensions { count: usize, limit: usize },

    #[error("more than one dimension carries the `{0}` role")]
    DuplicateRole(&'static str),

    #[error("dimension `{0}` is not ordinal and cannot carry an inverted index")]
    InvertedIndexOnNonOrdinal(String),

    #[error("dimension `{0}` has no inverted index")]
    NotIndexed(String),

    #[error("provider shape mismatch: {0}")]
    ProviderMismatch(String),

    #[error("provider does not support appending data")]
    AppendUnsupported,

    #[error("row {row} has {got} values, expected {expected}")]
    RowWidth {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("{rows} rows exceed the limit of {limit} raw rows")]
    TooManyRows { rows: usize, limit: usize },

    #[error("no data provider attached")]
    NoProvider,

    #[error("invalid sampling rate {0}")]
    InvalidRate(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Logs a contract violation and hands it back, so call sites can write
/// `return Err(violation(..))`.
pub(crate) fn violation(err: StoreError) -> StoreError {
    tracing::warn!(error = %err, "contract violation");
    err
}
