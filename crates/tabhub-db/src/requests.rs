use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;

use crate::models::{NewRequest, RequestRow};
use crate::users::bump_requests_num;
use crate::{Database, DbError, Result, time};

const REQUEST_COLUMNS: &str =
    "id, \"user\", userId, song, artist, comment, date, number_of_replies, link";

impl Database {
    pub fn list_requests(&self) -> Result<Vec<RequestRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("SELECT {REQUEST_COLUMNS} FROM requests"))?;
            let rows = stmt
                .query_map([], map_request)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Insert a request with `number_of_replies = 0`. An id collision is a
    /// primary key violation and comes back as [`DbError::Sqlite`].
    pub fn create_request(&self, new: &NewRequest) -> Result<RequestRow> {
        let row = self.with_conn_mut(|conn| insert_request(conn, new))?;
        info!("Request {} created by user {}", row.id, row.user_id);
        Ok(row)
    }

    /// Insert a request and count it against its author in one transaction.
    pub fn submit_request(&self, new: &NewRequest) -> Result<RequestRow> {
        let row = self.with_tx(|tx| {
            let row = insert_request(tx, new)?;
            bump_requests_num(tx, new.user_id)?;
            Ok(row)
        })?;
        info!("Request {} submitted by user {}", row.id, row.user_id);
        Ok(row)
    }

    pub fn get_request(&self, id: &str) -> Result<RequestRow> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?1"),
                [id],
                map_request,
            )
            .optional()?
            .ok_or_else(|| DbError::not_found("Request", id))
        })
    }

    pub fn requests_by_user(&self, user_id: i64) -> Result<Vec<RequestRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE userId = ?1"))?;
            let rows = stmt
                .query_map([user_id], map_request)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Requests whose song, artist or requester name contains `text`,
    /// ignoring case. An empty `text` matches every request.
    ///
    /// Matching happens here rather than in SQL so that case folding covers
    /// all of Unicode and `%`/`_` in the needle stay literal.
    pub fn search_requests(&self, text: &str) -> Result<Vec<RequestRow>> {
        let needle = text.to_lowercase();
        let rows = self.list_requests()?;

        Ok(rows
            .into_iter()
            .filter(|r| {
                [&r.song, &r.artist, &r.user]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect())
    }

    pub fn increment_reply_count(&self, id: &str) -> Result<()> {
        self.with_conn_mut(|conn| bump_reply_count(conn, id))
    }
}

pub(crate) fn bump_reply_count(conn: &Connection, id: &str) -> Result<()> {
    let changed = conn.execute(
        "UPDATE requests SET number_of_replies = number_of_replies + 1 WHERE id = ?1",
        [id],
    )?;
    if changed == 0 {
        return Err(DbError::not_found("Request", id));
    }
    Ok(())
}

fn insert_request(conn: &Connection, new: &NewRequest) -> Result<RequestRow> {
    let date = time::now();
    conn.execute(
        "INSERT INTO requests (id, \"user\", userId, song, artist, comment, date, link)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            new.id,
            new.user,
            new.user_id,
            new.song,
            new.artist,
            new.comment,
            date,
            new.link
        ],
    )?;

    Ok(RequestRow {
        id: new.id.clone(),
        user: new.user.clone(),
        user_id: new.user_id,
        song: new.song.clone(),
        artist: new.artist.clone(),
        comment: new.comment.clone(),
        date,
        number_of_replies: 0,
        link: new.link.clone(),
    })
}

fn map_request(row: &Row<'_>) -> rusqlite::Result<RequestRow> {
    Ok(RequestRow {
        id: row.get(0)?,
        user: row.get(1)?,
        user_id: row.get(2)?,
        song: row.get(3)?,
        artist: row.get(4)?,
        comment: row.get(5)?,
        date: row.get(6)?,
        number_of_replies: row.get(7)?,
        link: row.get(8)?,
    })
}
