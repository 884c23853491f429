// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use packshot_core::PackshotError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Handle to the Packshot SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path`, applies PRAGMAs,
    /// and runs pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, PackshotError> {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PackshotError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| PackshotError::Storage {
                source: Box::new(e),
            })?;
        conn.call(move |conn| -> Result<(), PackshotError> {
            let storage = |e: rusqlite::Error| PackshotError::Storage {
                source: Box::new(e),
            };
            let journal = if wal_mode { "WAL" } else { "DELETE" };
            conn.pragma_update_and_check(None, "journal_mode", journal, |row| {
                row.get::<_, String>(0)
            })
            .map_err(storage)?;
            conn.pragma_update(None, "synchronous", "NORMAL")
                .map_err(storage)?;
            conn.busy_timeout(Duration::from_secs(5)).map_err(storage)?;
            migrations::run_migrations(conn)
        })
        .await
        .map_err(flatten_call_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// Returns the underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Checkpoints the WAL so the main file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), PackshotError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Maps a tokio-rusqlite error onto [`PackshotError::Storage`].
pub(crate) fn map_tr_err(err: tokio_rusqlite::Error<rusqlite::Error>) -> PackshotError {
    match err {
        tokio_rusqlite::Error::Error(e) => PackshotError::Storage {
            source: Box::new(e),
        },
        other => PackshotError::Storage {
            source: other.to_string().into(),
        },
    }
}

/// Unwraps errors already expressed as [`PackshotError`] inside a call.
pub(crate) fn flatten_call_err(err: tokio_rusqlite::Error<PackshotError>) -> PackshotError {
    match err {
        tokio_rusqlite::Error::Error(e) => e,
        other => PackshotError::Storage {
            source: other.to_string().into(),
        },
    }
}
