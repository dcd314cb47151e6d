//! PDFs are stored as raw bytes and only become text at the JSON edge.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

pub use base64::DecodeError;

/// Text form of a stored PDF. A missing attachment stays `None` and is
/// serialized as `null`, never as an empty string.
pub fn encode_pdf(pdf: Option<&[u8]>) -> Option<String> {
    pdf.map(|bytes| B64.encode(bytes))
}

pub fn decode_pdf(text: &str) -> Result<Vec<u8>, DecodeError> {
    B64.decode(text)
}
