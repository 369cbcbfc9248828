//! Error taxonomy shared by the prayer-times client, the notification
//! scheduler and the progress ledger. The CLI layer wraps these in
//! `anyhow` and the dashboard renders them inline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Network or decode failure talking to the prayer-times API.
    #[error("Failed to fetch prayer times: {0}")]
    FetchFailed(String),

    /// The notification host rejected a request.
    #[error("Failed to schedule notifications: {0}")]
    SchedulingFailed(String),

    /// Read or write failure against the profile store.
    #[error("Store error: {0}")]
    StoreError(String),

    /// Bad user input.
    #[error("{0}")]
    ValidationError(String),

    #[error("Notification permission was not granted")]
    PermissionDenied,

    #[error("Not signed in. Run `miqat profile login <email>` first")]
    NotSignedIn,
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::StoreError(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::FetchFailed(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::FetchFailed(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
