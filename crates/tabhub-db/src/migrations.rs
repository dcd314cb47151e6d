use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL,
                password    TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                requestsNum INTEGER NOT NULL DEFAULT 0,
                repliesNum  INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE requests (
                id                TEXT PRIMARY KEY,
                \"user\"            TEXT NOT NULL,
                userId            INTEGER NOT NULL,
                song              TEXT NOT NULL,
                artist            TEXT NOT NULL,
                comment           TEXT NOT NULL,
                date              TEXT NOT NULL,
                number_of_replies INTEGER NOT NULL DEFAULT 0,
                link              TEXT NOT NULL
            );

            CREATE INDEX idx_requests_user ON requests(userId);

            CREATE TABLE replies (
                id          TEXT PRIMARY KEY,
                request_id  TEXT NOT NULL,
                username    TEXT NOT NULL,
                comment     TEXT NOT NULL,
                pdf         BLOB,
                userId      INTEGER NOT NULL,
                song        TEXT NOT NULL,
                artist      TEXT NOT NULL,
                date        TEXT NOT NULL
            );

            CREATE INDEX idx_replies_request ON replies(request_id);
            CREATE INDEX idx_replies_user ON replies(userId);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
