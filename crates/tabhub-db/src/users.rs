use rusqlite::{Connection, OptionalExtension, Row};
use tracing::info;

use crate::error::is_unique_violation;
use crate::models::UserRow;
use crate::{Database, DbError, Result, time};

const USER_COLUMNS: &str =
    "id, username, name, email, password, created_at, requestsNum, repliesNum";

impl Database {
    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users"))?;
            let rows = stmt
                .query_map([], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Insert a new user with both counters at zero.
    ///
    /// The username pre-check and the insert share one transaction, and the
    /// UNIQUE constraint catches anything that still slips through.
    pub fn create_user(
        &self,
        username: &str,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow> {
        let row = self.with_tx(|tx| {
            if query_user_by_username(tx, username)?.is_some() {
                return Err(DbError::DuplicateUsername(username.to_string()));
            }

            let created_at = time::now();
            tx.execute(
                "INSERT INTO users (username, name, email, password, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                (username, name, email, password_hash, &created_at),
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::DuplicateUsername(username.to_string())
                } else {
                    e.into()
                }
            })?;

            Ok(UserRow {
                id: tx.last_insert_rowid(),
                username: username.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                password: password_hash.to_string(),
                created_at,
                requests_num: 0,
                replies_num: 0,
            })
        })?;

        info!("User {} created with id {}", row.username, row.id);
        Ok(row)
    }

    /// Exact, case-sensitive lookup.
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn get_user(&self, id: i64) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                map_user,
            )
            .optional()?
            .ok_or_else(|| DbError::not_found("User", id))
        })
    }

    pub fn increment_requests_num(&self, id: i64) -> Result<()> {
        self.with_conn_mut(|conn| bump_requests_num(conn, id))
    }

    pub fn increment_replies_num(&self, id: i64) -> Result<()> {
        self.with_conn_mut(|conn| bump_replies_num(conn, id))
    }
}

pub(crate) fn bump_requests_num(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE users SET requestsNum = requestsNum + 1 WHERE id = ?1",
        [id],
    )?;
    if changed == 0 {
        return Err(DbError::not_found("User", id));
    }
    Ok(())
}

pub(crate) fn bump_replies_num(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute(
        "UPDATE users SET repliesNum = repliesNum + 1 WHERE id = ?1",
        [id],
    )?;
    if changed == 0 {
        return Err(DbError::not_found("User", id));
    }
    Ok(())
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let row = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            [username],
            map_user,
        )
        .optional()?;
    Ok(row)
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        password: row.get(4)?,
        created_at: row.get(5)?,
        requests_num: row.get(6)?,
        replies_num: row.get(7)?,
    })
}
