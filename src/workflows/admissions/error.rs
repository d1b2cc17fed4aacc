use super::repository::{MeetingLinkError, RepositoryError};

/// Error taxonomy shared by every admissions engine. Validation, not-found,
/// and authorization failures abort before any write; `Conflict` is kept
/// distinct from `InvalidState` so a losing booker knows it can retry a
/// different slot.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionsError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("not permitted to {0}")]
    Unauthorized(&'static str),
    #[error("invalid transition: {0}")]
    InvalidState(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    MeetingLink(#[from] MeetingLinkError),
    #[error("storage failure: {0}")]
    Store(String),
}

impl From<RepositoryError> for AdmissionsError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict => {
                AdmissionsError::Conflict("record already exists".to_string())
            }
            RepositoryError::NotFound => AdmissionsError::NotFound("record"),
            RepositoryError::Unavailable(reason) => AdmissionsError::Store(reason),
        }
    }
}
