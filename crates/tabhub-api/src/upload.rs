use std::collections::HashMap;

use axum::extract::Multipart;
use tracing::{debug, warn};

use tabhub_db::models::NewReply;

use crate::ApiError;

/// Form field carrying the PDF file.
pub const PDF_FIELD: &str = "pdf";

/// Buffer a reply upload (`request_id`, `username`, `comment`, `userId`,
/// `song`, `artist` and the `pdf` file) into a [`NewReply`].
///
/// Everything except `comment` is required, and the PDF must not be empty.
pub async fn read_reply_form(mut multipart: Multipart) -> Result<NewReply, ApiError> {
    let mut text: HashMap<String, String> = HashMap::new();
    let mut pdf: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == PDF_FIELD {
            let bytes = field.bytes().await?;
            debug!("Received {} PDF bytes", bytes.len());
            pdf = Some(bytes.to_vec());
        } else {
            let value = field.text().await?;
            text.insert(name, value);
        }
    }

    let pdf = match pdf {
        Some(bytes) if !bytes.is_empty() => bytes,
        Some(_) => {
            warn!("Rejected reply upload with an empty PDF");
            return Err(ApiError::BadRequest("pdf file is empty".into()));
        }
        None => {
            warn!("Rejected reply upload without a PDF");
            return Err(ApiError::BadRequest("missing required file: pdf".into()));
        }
    };

    let user_id = take(&mut text, "userId")?;
    let user_id: i64 = user_id
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("userId is not a number: {user_id}")))?;

    Ok(NewReply {
        request_id: take(&mut text, "request_id")?,
        username: take(&mut text, "username")?,
        comment: text.remove("comment").unwrap_or_default(),
        user_id,
        song: take(&mut text, "song")?,
        artist: take(&mut text, "artist")?,
        pdf,
    })
}

fn take(text: &mut HashMap<String, String>, name: &str) -> Result<String, ApiError> {
    text.remove(name)
        .ok_or_else(|| ApiError::BadRequest(format!("missing required field: {name}")))
}
