//! Conversions from external infrastructure errors into domain errors.

use gifscout_domain::{ConnectionError, GifScoutError};
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GifScoutError);

impl From<InfraError> for GifScoutError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GifScoutError> for InfraError {
    fn from(value: GifScoutError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoGifScoutError {
    fn into_gifscout(self) -> GifScoutError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → GifScoutError */
/* -------------------------------------------------------------------------- */

impl IntoGifScoutError for SqlError {
    fn into_gifscout(self) -> GifScoutError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        GifScoutError::Storage("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        GifScoutError::Storage("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 1555 | 2067) => {
                        GifScoutError::Storage("unique constraint violation".into())
                    }
                    (ErrorCode::NotADatabase, _) => {
                        GifScoutError::Storage("file is not a database".into())
                    }
                    _ => GifScoutError::Storage(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                GifScoutError::Storage(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                GifScoutError::Storage(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => GifScoutError::Storage(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => GifScoutError::Storage(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_gifscout())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → GifScoutError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(GifScoutError::Storage(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → GifScoutError */
/* -------------------------------------------------------------------------- */

impl IntoGifScoutError for HttpError {
    fn into_gifscout(self) -> GifScoutError {
        // Transport failures are retried like a 503.
        if self.is_timeout() || self.is_connect() {
            return ConnectionError::network_issue(None).into();
        }

        if let Some(status) = self.status() {
            return ConnectionError::from_status(status.as_u16(), None).into();
        }

        if self.is_decode() {
            return GifScoutError::Serialization(format!("invalid response body: {self}"));
        }

        if self.is_builder() {
            return GifScoutError::Network(format!("invalid HTTP request: {self}"));
        }

        GifScoutError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_gifscout())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
