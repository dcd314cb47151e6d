use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A registered account. The stored credential is never part of this shape.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "requestsNum")]
    pub requests_num: i64,
    #[serde(rename = "repliesNum")]
    pub replies_num: i64,
}

/// A user's ask for the tablature of a song.
///
/// `user` and `link` are display copies taken at creation time and are never
/// refreshed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TabRequest {
    pub id: String,
    pub user: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub song: String,
    pub artist: String,
    pub comment: String,
    pub date: DateTime<Utc>,
    pub number_of_replies: i64,
    pub link: String,
}

/// A PDF tab submitted against a request.
///
/// `pdf` is the base64 text form of the stored bytes, or `None` (JSON `null`)
/// when the row has no attachment.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Reply {
    pub id: String,
    pub request_id: String,
    pub username: String,
    pub comment: String,
    pub pdf: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub song: String,
    pub artist: String,
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_use_camel_case_names() {
        let user = User {
            id: 7,
            username: "alice".into(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            created_at: Utc::now(),
            requests_num: 2,
            replies_num: 3,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["requestsNum"], 2);
        assert_eq!(json["repliesNum"], 3);
        assert!(json.get("password").is_none());
    }

    #[test]
    fn missing_pdf_serializes_as_null() {
        let reply = Reply {
            id: "0b6f3a52-legacy".into(),
            request_id: "r1".into(),
            username: "bob".into(),
            comment: String::new(),
            pdf: None,
            user_id: 1,
            song: "Clocks".into(),
            artist: "Coldplay".into(),
            date: Utc::now(),
        };

        let json = serde_json::to_value(&reply).unwrap();
        assert!(json["pdf"].is_null());
        assert_eq!(json["userId"], 1);
        assert_eq!(json["id"], "0b6f3a52-legacy");
    }
}
