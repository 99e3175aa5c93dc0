use crate::errors::{AppError, AppResult};
use rusqlite::Connection;
use tracing::info;

/// Schema steps, applied in order. `PRAGMA user_version` records how many ran.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "create log table",
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    ),
    (
        "create pending_reservations table",
        r#"
        CREATE TABLE IF NOT EXISTS pending_reservations (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            date        TEXT NOT NULL,
            location    TEXT NOT NULL,
            bay         TEXT NOT NULL,
            seat        TEXT NOT NULL,
            occupant    TEXT NOT NULL,
            department  TEXT NOT NULL DEFAULT '',
            status      TEXT NOT NULL DEFAULT 'unconfirmed'
                        CHECK(status IN ('unconfirmed','acknowledged','conflicted')),
            attempts    INTEGER NOT NULL DEFAULT 1,
            last_error  TEXT,
            created_at  TEXT,
            updated_at  TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_pending_identity
            ON pending_reservations(date, location, bay, seat);
        "#,
    ),
];

fn schema_version(conn: &Connection) -> AppResult<usize> {
    let v: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    usize::try_from(v).map_err(|_| AppError::Migration(format!("negative user_version {v}")))
}

/// Apply every migration the database has not seen yet.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    let current = schema_version(conn)?;

    if current > MIGRATIONS.len() {
        return Err(AppError::Migration(format!(
            "database schema v{current} is newer than this build (v{})",
            MIGRATIONS.len()
        )));
    }

    for (idx, (name, sql)) in MIGRATIONS.iter().enumerate().skip(current) {
        let version = idx + 1;
        let step_failed =
            |e: rusqlite::Error| AppError::Migration(format!("step {version} ({name}) failed: {e}"));

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql).map_err(step_failed)?;
        tx.pragma_update(None, "user_version", version as i64)
            .map_err(step_failed)?;
        tx.commit()?;
        info!(version, name, "applied migration");
    }

    Ok(())
}
