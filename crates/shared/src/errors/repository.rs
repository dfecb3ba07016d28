use sqlx::Error as SqlxError;
use thiserror::Error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const QUERY_CANCELED: &str = "57014";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(SqlxError),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    #[error("Lock wait timed out: {0}")]
    LockTimeout(String),

    #[error("Custom: {0}")]
    Custom(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        if matches!(err, SqlxError::RowNotFound) {
            return RepositoryError::NotFound;
        }

        let (code, message) = match &err {
            SqlxError::Database(db_err) => (
                db_err.code().map(|code| code.into_owned()),
                db_err.message().to_string(),
            ),
            _ => (None, String::new()),
        };

        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => RepositoryError::AlreadyExists(message),
            Some(FOREIGN_KEY_VIOLATION) => RepositoryError::ForeignKey(message),
            Some(LOCK_NOT_AVAILABLE) | Some(QUERY_CANCELED) => RepositoryError::LockTimeout(message),
            _ => RepositoryError::Sqlx(err),
        }
    }
}
