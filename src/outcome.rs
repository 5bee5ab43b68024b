use std::sync::Arc;

use thiserror::Error;
use tracing::error;

/// Failure taxonomy surfaced through [`Outcome::Error`].
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected before touching the store.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
    /// A persisted value could not be mapped back to a domain value.
    #[error("{0}")]
    Decode(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result of an operation crossing the persistence boundary.
///
/// Reads deliver a sequence of these (one per change of the underlying
/// data), writes deliver exactly one.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Success(T),
    Error {
        cause: Arc<AppError>,
        message: String,
    },
    Loading,
}

impl<T> Outcome<T> {
    /// Error whose message is the cause's own message.
    pub fn error(cause: impl Into<AppError>) -> Self {
        let cause = cause.into();
        let message = cause.to_string();
        Self::Error {
            cause: Arc::new(cause),
            message,
        }
    }

    pub fn error_with(cause: impl Into<AppError>, message: impl Into<String>) -> Self {
        Self::Error {
            cause: Arc::new(cause.into()),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::error(AppError::validation(message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn cause(&self) -> Option<&Arc<AppError>> {
        match self {
            Self::Error { cause, .. } => Some(cause),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(v) => Outcome::Success(f(v)),
            Self::Error { cause, message } => Outcome::Error { cause, message },
            Self::Loading => Outcome::Loading,
        }
    }

    /// `Loading` is reported as an error: the value is not available yet.
    pub fn into_result(self) -> Result<T, Arc<AppError>> {
        match self {
            Self::Success(v) => Ok(v),
            Self::Error { cause, .. } => Err(cause),
            Self::Loading => Err(Arc::new(AppError::Decode("result is still loading".into()))),
        }
    }
}

/// Decodes fetched rows, or reports the failure under `message`.
pub(crate) fn from_rows<R, T>(
    fetched: anyhow::Result<Vec<R>>,
    message: impl FnOnce() -> String,
) -> Outcome<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    let decoded = fetched
        .map_err(AppError::Storage)
        .and_then(|rows| rows.into_iter().map(T::try_from).collect());
    settle(decoded, message)
}

pub(crate) fn from_row<R, T>(
    fetched: anyhow::Result<Option<R>>,
    message: impl FnOnce() -> String,
) -> Outcome<Option<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    let decoded = fetched
        .map_err(AppError::Storage)
        .and_then(|row| row.map(T::try_from).transpose());
    settle(decoded, message)
}

pub(crate) fn from_write<T>(
    written: anyhow::Result<T>,
    message: impl FnOnce() -> String,
) -> Outcome<T> {
    settle(written.map_err(AppError::Storage), message)
}

fn settle<T>(res: Result<T, AppError>, message: impl FnOnce() -> String) -> Outcome<T> {
    match res {
        Ok(v) => Outcome::Success(v),
        Err(e) => {
            let message = message();
            error!(error = %e, %message, "storage operation failed");
            Outcome::error_with(e, message)
        }
    }
}

#[cfg(test)]
mod outcome_tests {
    use super::*;

    #[test]
    fn error_message_defaults_to_cause() {
        let o: Outcome<()> = Outcome::validation("Quantity must be positive");
        assert_eq!(o.error_message(), Some("Quantity must be positive"));
        assert!(o.cause().unwrap().is_validation());
    }

    #[test]
    fn storage_error_keeps_operation_message() {
        let o: Outcome<i64> =
            Outcome::error_with(anyhow::anyhow!("disk I/O error"), "Failed to add list item");
        assert_eq!(o.error_message(), Some("Failed to add list item"));
        assert_eq!(o.cause().unwrap().to_string(), "disk I/O error");
        assert!(!o.cause().unwrap().is_validation());
    }

    #[test]
    fn from_write_wraps_failures() {
        let ok = from_write(Ok(5_i64), || "unused".into());
        assert_eq!(ok.ok(), Some(5));

        let failed: Outcome<i64> =
            from_write(Err(anyhow::anyhow!("locked")), || "Failed to create recipe".into());
        assert_eq!(failed.error_message(), Some("Failed to create recipe"));
    }

    #[test]
    fn map_and_into_result() {
        let o = Outcome::Success(2).map(|v| v * 21);
        assert_eq!(o.clone().ok(), Some(42));
        assert_eq!(o.into_result().unwrap(), 42);

        let loading: Outcome<i32> = Outcome::Loading;
        assert!(loading.into_result().is_err());
    }
}
