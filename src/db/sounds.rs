use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};

use crate::models::RecordedSound;

/// Load every stored recording ordered by insertion. Run once at startup to
/// restore the in-memory list; afterwards the list and the store stay in
/// sync purely through mirrored insert/delete calls.
pub fn fetch_recordings(conn: &Connection) -> Result<Vec<RecordedSound>> {
    let mut stmt = conn
        .prepare("SELECT id, title, soundUri FROM sounds ORDER BY id")
        .context("failed to prepare recordings query")?;

    let recordings = stmt
        .query_map([], |row| {
            Ok(RecordedSound {
                id: row.get(0)?,
                title: row.get(1)?,
                sound_uri: row.get(2)?,
            })
        })
        .context("failed to iterate recordings")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect recordings")?;

    Ok(recordings)
}

/// Insert a new recording row, returning the hydrated struct so the caller
/// can push it straight onto the in-memory list. The id comes from SQLite's
/// rowid allocator; with AUTOINCREMENT it is never reused after a delete.
pub fn insert_recording(conn: &Connection, title: &str, sound_uri: &str) -> Result<RecordedSound> {
    conn.execute(
        "INSERT INTO sounds (title, soundUri) VALUES (?1, ?2)",
        params![title, sound_uri],
    )
    .context("failed to insert recording")?;

    let id = conn.last_insert_rowid();
    Ok(RecordedSound {
        id,
        title: title.to_string(),
        sound_uri: sound_uri.to_string(),
    })
}

/// Remove a recording row. We surface an explicit error when nothing was
/// deleted so the caller can tell a stale id apart from a successful delete.
pub fn delete_recording(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM sounds WHERE id = ?1", params![id])
        .context("failed to delete recording")?;

    if deleted == 0 {
        Err(anyhow!("Recording not found"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::apply_schema;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().expect("in-memory database");
        apply_schema(&conn).expect("schema");
        conn
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let conn = test_conn();
        let first = insert_recording(&conn, "Recorded Sound 1", "/tmp/a.wav").unwrap();
        let second = insert_recording(&conn, "Recorded Sound 2", "/tmp/b.wav").unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.id > first.id);
    }

    #[test]
    fn fetch_returns_rows_in_insertion_order() {
        let conn = test_conn();
        insert_recording(&conn, "Recorded Sound 1", "/tmp/a.wav").unwrap();
        insert_recording(&conn, "Recorded Sound 2", "/tmp/b.wav").unwrap();

        let rows = fetch_recordings(&conn).unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Recorded Sound 1", "Recorded Sound 2"]);
        assert_eq!(rows[0].sound_uri, "/tmp/a.wav");
    }

    #[test]
    fn delete_removes_only_the_matching_row() {
        let conn = test_conn();
        let first = insert_recording(&conn, "Recorded Sound 1", "/tmp/a.wav").unwrap();
        let second = insert_recording(&conn, "Recorded Sound 2", "/tmp/b.wav").unwrap();

        delete_recording(&conn, first.id).unwrap();

        let rows = fetch_recordings(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, second.id);
        assert_eq!(rows[0].title, "Recorded Sound 2");
    }

    #[test]
    fn delete_of_missing_id_errors() {
        let conn = test_conn();
        let err = delete_recording(&conn, 42).unwrap_err();
        assert_eq!(err.to_string(), "Recording not found");
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let conn = test_conn();
        let first = insert_recording(&conn, "Recorded Sound 1", "/tmp/a.wav").unwrap();
        delete_recording(&conn, first.id).unwrap();

        let next = insert_recording(&conn, "Recorded Sound 1", "/tmp/b.wav").unwrap();
        assert!(next.id > first.id);
    }

    #[test]
    fn schema_creation_is_idempotent() {
        let conn = test_conn();
        insert_recording(&conn, "Recorded Sound 1", "/tmp/a.wav").unwrap();
        apply_schema(&conn).unwrap();
        assert_eq!(fetch_recordings(&conn).unwrap().len(), 1);
    }
}
