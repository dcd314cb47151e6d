pub mod cancel;
pub mod error;
pub mod migrations;
pub mod models;
pub mod replies;
pub mod requests;
pub mod time;
pub mod users;

use rusqlite::{Connection, InterruptHandle, OpenFlags, Transaction};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

pub use cancel::CancelToken;
pub use error::{DbError, Result};

const READER_POOL_SIZE: usize = 4;

/// SQLite store with a reader/writer split.
///
/// All writes go through the single writer connection, reads are spread over
/// a small pool of read-only connections. Nothing is cached between calls.
pub struct Database {
    writer: Mutex<Connection>,
    writer_interrupt: InterruptHandle,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let writer = Connection::open(path)?;
        writer.busy_timeout(busy_timeout)?;

        // WAL mode for concurrent reads
        writer.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;

        migrations::run(&writer)?;
        let writer_interrupt = writer.get_interrupt_handle();

        let mut readers = Vec::with_capacity(READER_POOL_SIZE);
        for _ in 0..READER_POOL_SIZE {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            conn.busy_timeout(busy_timeout)?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            path.display(),
            READER_POOL_SIZE
        );
        Ok(Self {
            writer: Mutex::new(writer),
            writer_interrupt,
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    /// Run `f` on one of the read-only connections.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        f(&conn)
    }

    /// Run `f` on the writer connection, one statement at a time.
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        cancel::check()?;
        f(&conn)
    }

    /// Run `f` inside a writer transaction. Any error rolls the whole unit back.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self
            .writer
            .lock()
            .map_err(|e| DbError::LockPoisoned(e.to_string()))?;
        cancel::check()?;
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        cancel::check()?;
        tx.commit()?;
        Ok(out)
    }

    /// Abort whatever statement the writer connection is running. The
    /// interrupted statement fails and its transaction rolls back.
    pub fn interrupt_writer(&self) {
        self.writer_interrupt.interrupt();
    }
}


#[cfg(test)]
mod tests {
    use crate::test_support::TempDb;
    use crate::{CancelToken, DbError};

    #[test]
    fn cancelled_write_never_starts() {
        let db = TempDb::new();
        let token = CancelToken::new();
        token.cancel();

        let _scope = token.enter();
        let err = db
            .create_user("alice", "Alice", "a@example.com", "hash")
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(db.list_users().unwrap().is_empty());
    }

    #[test]
    fn cancel_before_commit_rolls_back() {
        let db = TempDb::new();
        let token = CancelToken::new();
        let _scope = token.enter();

        let result = db.with_tx(|tx| {
            tx.execute(
                "INSERT INTO users (username, name, email, password, created_at)
                 VALUES ('alice', 'Alice', 'a@example.com', 'hash', '2024-01-01 00:00:00')",
                [],
            )?;
            token.cancel();
            Ok(())
        });

        assert!(matches!(result, Err(DbError::Cancelled)));
        assert!(db.list_users().unwrap().is_empty());
    }

    #[test]
    fn uncancelled_token_lets_writes_through() {
        let db = TempDb::new();
        let token = CancelToken::new();
        let _scope = token.enter();

        db.create_user("alice", "Alice", "a@example.com", "hash")
            .unwrap();
        assert_eq!(db.list_users().unwrap().len(), 1);
    }
}
