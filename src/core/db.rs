//! SQLite connection setup and schema management

use anyhow::Result;
use tokio_rusqlite::Connection;

/// Open the database for use from async handlers. Foreign keys are
/// enabled so calendar deletion cascades to members and events.
pub async fn async_db(db_path: &str) -> Result<Connection> {
    let db = Connection::open(db_path).await?;
    db.call(|conn| {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    })
    .await?;
    Ok(db)
}

/// Create all tables. Idempotent so it can run at every init.
pub fn initialize_db(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS profile (
            id TEXT PRIMARY KEY,
            email TEXT,
            full_name TEXT,
            avatar_url TEXT
        );

        CREATE TABLE IF NOT EXISTS calendar (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            owner_id TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS calendar_member (
            calendar_id TEXT NOT NULL
                REFERENCES calendar (id) ON DELETE CASCADE,
            user_id TEXT NOT NULL,
            role TEXT NOT NULL,
            accepted INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (calendar_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS event (
            id TEXT PRIMARY KEY,
            calendar_id TEXT NOT NULL
                REFERENCES calendar (id) ON DELETE CASCADE,
            owner_id TEXT NOT NULL,
            title TEXT NOT NULL,
            status TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT,
            kind TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_event_calendar ON event (calendar_id);
        CREATE INDEX IF NOT EXISTS idx_member_user ON calendar_member (user_id);
        "#,
    )?;
    Ok(())
}

/// Apply schema changes. The schema is created with IF NOT EXISTS so a
/// migration is currently just a re-run of the initializer.
pub fn migrate_db(conn: &rusqlite::Connection) -> Result<()> {
    initialize_db(conn)
}
