//! Error type for `scribe-store-sqlite`.

use scribe_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] scribe_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  /// Turn a failed insert into [`scribe_core::Error::ConstraintViolation`]
  /// when SQLite rejected it for breaking a `UNIQUE` rule.
  pub(crate) fn from_insert(err: tokio_rusqlite::Error, what: &str) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, _)) = &err
      && code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    {
      return Self::Core(scribe_core::Error::ConstraintViolation(what.to_owned()));
    }
    Self::Database(err)
  }
}

impl StoreError for Error {
  fn is_constraint_violation(&self) -> bool {
    matches!(self, Self::Core(scribe_core::Error::ConstraintViolation(_)))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
