// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON document operations.

use packshot_core::PackshotError;
use rusqlite::params;

use crate::database::Database;

/// Get a document by key, parsed as JSON.
pub async fn get_document(
    db: &Database,
    key: &str,
) -> Result<Option<serde_json::Value>, PackshotError> {
    let key = key.to_string();
    let raw = db
        .connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT value FROM documents WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            );
            match result {
                Ok(value) => Ok(Some(value)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    raw.map(|text| {
        serde_json::from_str(&text).map_err(|e| PackshotError::Storage {
            source: Box::new(e),
        })
    })
    .transpose()
}

/// Insert or replace a document.
pub async fn put_document(
    db: &Database,
    key: &str,
    value: &serde_json::Value,
) -> Result<(), PackshotError> {
    let key = key.to_string();
    let text = serde_json::to_string(value).map_err(|e| PackshotError::Storage {
        source: Box::new(e),
    })?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO documents (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                     value = excluded.value,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, text],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete every blob and document in one transaction.
pub async fn clear_all(db: &Database) -> Result<(), PackshotError> {
    db.connection()
        .call(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM blobs", [])?;
            tx.execute("DELETE FROM documents", [])?;
            tx.commit()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
