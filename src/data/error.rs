use thiserror::Error;

/// Failure to materialize the dataset. Fatal to the dashboard.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("dataset unavailable from {origin}: {reason}")]
    Unavailable { origin: String, reason: String },
}

impl DataError {
    pub(crate) fn unavailable(origin: impl ToString, cause: anyhow::Error) -> Self {
        DataError::Unavailable {
            origin: origin.to_string(),
            reason: format!("{cause:#}"),
        }
    }
}
