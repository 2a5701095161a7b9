use thiserror::Error;

/// Failures raised by an [`EntityStore`](crate::db::EntityStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Outcome of a rejected vote submission.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("question not found")]
    QuestionNotFound,
    #[error("You didn't select a choice.")]
    NoChoiceSelected,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
