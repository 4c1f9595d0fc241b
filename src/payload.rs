//! Payload classification.
//!
//! Text and files share one transport. Files are wrapped in a data URI
//! (`data:<mime>;base64,<data>`) before encryption, so after decryption the
//! `data:` marker is enough to tell them apart without extra metadata.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use log::debug;

/// Marker that starts every typed payload.
pub const DATA_URI_PREFIX: &str = "data:";

/// MIME type assumed when neither the path nor the URI header names one.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// MIME type of a data URI with an empty header (RFC 2397).
const DATA_URI_DEFAULT_MIME: &str = "text/plain";

/// Known file extensions and their MIME types.
const MIME_TABLE: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    ("docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    ("xls", "application/vnd.ms-excel"),
    ("xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("json", "application/json"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("bin", DEFAULT_MIME),
];

/// A decrypted payload, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Plain UTF-8 text.
    Text(String),
    /// A file carried as a data URI.
    TypedBlob { mime: String, data: Vec<u8> },
}

impl Payload {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// MIME hint of a typed blob.
    pub fn mime(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::TypedBlob { mime, .. } => Some(mime),
        }
    }

    /// Content bytes: UTF-8 for text, decoded data for blobs.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::TypedBlob { data, .. } => data,
        }
    }
}

/// Classifies decrypted bytes as text or a typed blob.
///
/// Never fails: a `data:` payload that does not parse is returned as text,
/// and invalid UTF-8 is replaced with U+FFFD.
pub fn classify(bytes: &[u8]) -> Payload {
    if bytes.starts_with(DATA_URI_PREFIX.as_bytes()) {
        if let Some((mime, data)) = parse_data_uri(bytes) {
            debug!("Payload is a {} blob of {} bytes", mime, data.len());
            return Payload::TypedBlob { mime, data };
        }
        debug!("Payload starts with a data URI marker but does not parse, treating as text");
    }

    Payload::Text(String::from_utf8_lossy(bytes).into_owned())
}

/// Wraps bytes as `data:<mime>;base64,<data>`.
pub fn to_data_uri(data: &[u8], mime: &str) -> String {
    format!("{}{};base64,{}", DATA_URI_PREFIX, mime, BASE64.encode(data))
}

/// Guesses a MIME type from a file extension.
pub fn mime_from_path<P: AsRef<Path>>(path: P) -> &'static str {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    MIME_TABLE
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME)
}

/// File extension for a MIME type, `bin` when unknown.
pub fn extension_for_mime(mime: &str) -> &'static str {
    let mime = mime.to_lowercase();
    MIME_TABLE
        .iter()
        .find(|(_, known)| *known == mime)
        .map(|(ext, _)| *ext)
        .unwrap_or("bin")
}

fn parse_data_uri(bytes: &[u8]) -> Option<(String, Vec<u8>)> {
    let rest = &bytes[DATA_URI_PREFIX.len()..];
    let comma = rest.iter().position(|&b| b == b',')?;
    let header = std::str::from_utf8(&rest[..comma]).ok()?;
    let body = &rest[comma + 1..];

    let mut params = header.split(';');
    let mime = params.next().unwrap_or("").trim();
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let data = if is_base64 {
        BASE64.decode(body).ok()?
    } else {
        percent_decode(body)
    };

    let mime = if mime.is_empty() {
        DATA_URI_DEFAULT_MIME.to_string()
    } else {
        mime.to_string()
    };

    Some((mime, data))
}

/// Decodes `%XX` escapes; malformed escapes are kept verbatim.
fn percent_decode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'%' && i + 2 < input.len() {
            if let (Some(hi), Some(lo)) = (hex_value(input[i + 1]), hex_value(input[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(input[i]);
        i += 1;
    }
    out
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
