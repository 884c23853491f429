// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image blob operations.

use packshot_core::PackshotError;
use rusqlite::params;

use crate::database::Database;

/// Get a blob by id.
pub async fn get_blob(db: &Database, id: &str) -> Result<Option<Vec<u8>>, PackshotError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT data FROM blobs WHERE id = ?1",
                params![id],
                |row| row.get::<_, Vec<u8>>(0),
            );
            match result {
                Ok(data) => Ok(Some(data)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert or replace a blob.
pub async fn put_blob(db: &Database, id: &str, data: &[u8]) -> Result<(), PackshotError> {
    let id = id.to_string();
    let data = data.to_vec();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO blobs (id, data) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET
                     data = excluded.data,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![id, data],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a blob. Returns whether one existed.
pub async fn delete_blob(db: &Database, id: &str) -> Result<bool, PackshotError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute("DELETE FROM blobs WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count stored blobs.
pub async fn count_blobs(db: &Database) -> Result<i64, PackshotError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM blobs", [], |row| row.get(0)))
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blobs.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn missing_blob_is_none() {
        let (_dir, db) = open_db().await;
        assert!(get_blob(&db, "pizza-001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_overwrites_existing_blob() {
        let (_dir, db) = open_db().await;
        put_blob(&db, "pizza-001", b"first").await.unwrap();
        put_blob(&db, "pizza-001", b"second").await.unwrap();

        assert_eq!(get_blob(&db, "pizza-001").await.unwrap().unwrap(), b"second");
        assert_eq!(count_blobs(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_removes_only_the_named_blob() {
        let (_dir, db) = open_db().await;
        put_blob(&db, "pizza-001", b"a").await.unwrap();
        put_blob(&db, "pizza-002", b"b").await.unwrap();

        assert!(delete_blob(&db, "pizza-001").await.unwrap());
        assert!(!delete_blob(&db, "pizza-001").await.unwrap());
        assert!(get_blob(&db, "pizza-001").await.unwrap().is_none());
        assert_eq!(count_blobs(&db).await.unwrap(), 1);
    }
}
