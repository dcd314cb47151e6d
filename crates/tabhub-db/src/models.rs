/// Database row types. These map directly to SQLite rows and are kept
/// separate from the tabhub-types wire models.

#[derive(Debug)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password: String,
    pub created_at: String,
    pub requests_num: i64,
    pub replies_num: i64,
}

#[derive(Debug)]
pub struct RequestRow {
    pub id: String,
    pub user: String,
    pub user_id: i64,
    pub song: String,
    pub artist: String,
    pub comment: String,
    pub date: String,
    pub number_of_replies: i64,
    pub link: String,
}

#[derive(Debug)]
pub struct ReplyRow {
    pub id: String,
    pub request_id: String,
    pub username: String,
    pub comment: String,
    pub pdf: Option<Vec<u8>>,
    pub user_id: i64,
    pub song: String,
    pub artist: String,
    pub date: String,
}

/// Fields the caller supplies when creating a request.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub id: String,
    pub user: String,
    pub user_id: i64,
    pub song: String,
    pub artist: String,
    pub comment: String,
    pub link: String,
}

/// Fields the caller supplies when creating a reply.
#[derive(Debug, Clone)]
pub struct NewReply {
    pub request_id: String,
    pub username: String,
    pub comment: String,
    pub user_id: i64,
    pub song: String,
    pub artist: String,
    pub pdf: Vec<u8>,
}
