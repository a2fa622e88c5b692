use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot create database directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema step was rolled back; earlier versions stay applied.
    #[error("schema migration v{version} failed: {source}")]
    Migration {
        version: u32,
        #[source]
        source: rusqlite::Error,
    },

    /// A stored row does not map back onto a [`crate::Job`].
    #[error("job {id} has an unreadable row: {reason}")]
    CorruptRow { id: String, reason: String },

    /// A worker panicked while holding the connection.
    #[error("database connection lock poisoned")]
    LockPoisoned,
}
