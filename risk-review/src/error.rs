use risk_engine::StoreError;
use thiserror::Error;

/// Every failure mode of the review workflow has a named variant.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("case {0} not found")]
    CaseNotFound(String),
    #[error("case {0} is closed")]
    CaseClosed(String),
}
