use rusqlite::{Connection, Row, params};
use tracing::info;
use uuid::Uuid;

use crate::models::{NewReply, ReplyRow};
use crate::requests::bump_reply_count;
use crate::users::bump_replies_num;
use crate::{Database, Result, time};

const REPLY_COLUMNS: &str =
    "id, request_id, username, comment, pdf, userId, song, artist, date";

impl Database {
    /// Store a reply with a fresh id and a persisted creation date.
    /// The counters are left alone; see [`Database::submit_reply`].
    pub fn create_reply(&self, new: NewReply) -> Result<ReplyRow> {
        let row = self.with_conn_mut(|conn| insert_reply(conn, new))?;
        info!("Reply {} stored for request {}", row.id, row.request_id);
        Ok(row)
    }

    /// Store a reply and bump the author's `repliesNum` and the parent's
    /// `number_of_replies` as a single unit.
    pub fn submit_reply(&self, new: NewReply) -> Result<ReplyRow> {
        let row = self.with_tx(|tx| {
            let row = insert_reply(tx, new)?;
            bump_replies_num(tx, row.user_id)?;
            bump_reply_count(tx, &row.request_id)?;
            Ok(row)
        })?;
        info!("Reply {} submitted for request {}", row.id, row.request_id);
        Ok(row)
    }

    pub fn replies_by_request(&self, request_id: &str) -> Result<Vec<ReplyRow>> {
        self.with_conn(|conn| query_replies(conn, "request_id", &request_id))
    }

    pub fn replies_by_user(&self, user_id: i64) -> Result<Vec<ReplyRow>> {
        self.with_conn(|conn| query_replies(conn, "userId", &user_id))
    }
}

fn insert_reply(conn: &Connection, new: NewReply) -> Result<ReplyRow> {
    let id = Uuid::new_v4().to_string();
    let date = time::now();
    conn.execute(
        "INSERT INTO replies (id, request_id, username, comment, pdf, userId, song, artist, date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            new.request_id,
            new.username,
            new.comment,
            new.pdf,
            new.user_id,
            new.song,
            new.artist,
            date
        ],
    )?;

    Ok(ReplyRow {
        id,
        request_id: new.request_id,
        username: new.username,
        comment: new.comment,
        pdf: Some(new.pdf),
        user_id: new.user_id,
        song: new.song,
        artist: new.artist,
        date,
    })
}

fn query_replies(
    conn: &Connection,
    column: &str,
    value: &dyn rusqlite::ToSql,
) -> Result<Vec<ReplyRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REPLY_COLUMNS} FROM replies WHERE {column} = ?1"
    ))?;
    let rows = stmt
        .query_map(&[value], map_reply)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn map_reply(row: &Row<'_>) -> rusqlite::Result<ReplyRow> {
    Ok(ReplyRow {
        id: row.get(0)?,
        request_id: row.get(1)?,
        username: row.get(2)?,
        comment: row.get(3)?,
        pdf: row.get(4)?,
        user_id: row.get(5)?,
        song: row.get(6)?,
        artist: row.get(7)?,
        date: row.get(8)?,
    })
}
