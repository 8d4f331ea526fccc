//! Cache key derivation for image content.
//!
//! Keys are plain strings: a namespace tag followed by a SHA-256 hex digest.
//! Batches join per-image keys with `|`, and cascade keys append a digest of
//! the question text so the same picture asked about differently is cached
//! separately.

use base64::Engine as _;
use sha2::{Digest, Sha256};
use url::Url;

use crate::types::{ContentPart, ImageSource};

pub const EMBEDDED_TAG: &str = "img_b64_";
pub const REMOTE_TAG: &str = "img_url_";
pub const UNKNOWN_TAG: &str = "img_unknown_";
pub const BATCH_DELIMITER: &str = "|";
pub const CONTEXT_MARKER: &str = "_ctx_";

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes.as_ref());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Key for a single content part; `None` for text parts.
pub fn image_key(part: &ContentPart) -> Option<String> {
    part.image_source().map(source_key)
}

/// Key for a classified image source. Never fails.
pub fn source_key(source: ImageSource<'_>) -> String {
    match source {
        ImageSource::Embedded(data_url) => embedded_key(data_url),
        ImageSource::Remote(url) => remote_key(url),
        ImageSource::Other(raw) => format!("{}{}", UNKNOWN_TAG, sha256_hex(raw)),
    }
}

/// Digest of the decoded payload of a data URL.
///
/// A missing `,` separator or an undecodable base64 body falls back to a
/// digest of the whole raw string.
fn embedded_key(data_url: &str) -> String {
    let Some((header, payload)) = data_url.split_once(',') else {
        return format!("{}{}", EMBEDDED_TAG, sha256_hex(data_url));
    };

    if header.ends_with(";base64") {
        match base64::engine::general_purpose::STANDARD.decode(payload.trim()) {
            Ok(bytes) => format!("{}{}", EMBEDDED_TAG, sha256_hex(bytes)),
            Err(_) => format!("{}{}", EMBEDDED_TAG, sha256_hex(data_url)),
        }
    } else {
        format!("{}{}", EMBEDDED_TAG, sha256_hex(payload))
    }
}

fn remote_key(url: &str) -> String {
    let canonical = canonicalize_url(url).unwrap_or_else(|| url.to_string());
    format!("{}{}", REMOTE_TAG, sha256_hex(canonical))
}

/// Rebuild `url` with its query pairs sorted; `None` if it does not parse.
///
/// Scheme, authority, path and fragment are kept as the URL parser
/// normalizes them.
pub fn canonicalize_url(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;

    let mut pairs: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
    if pairs.is_empty() {
        parsed.set_query(None);
    } else {
        pairs.sort();
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }

    Some(parsed.to_string())
}

/// Key for an ordered batch of parts. Text parts are skipped; a batch with no
/// images yields `None`, meaning "do not cache".
pub fn batch_key<'a>(parts: impl IntoIterator<Item = &'a ContentPart>) -> Option<String> {
    let keys: Vec<String> = parts.into_iter().filter_map(image_key).collect();
    if keys.is_empty() {
        None
    } else {
        Some(keys.join(BATCH_DELIMITER))
    }
}

/// Batch key qualified by the text the images were sent with.
pub fn cascade_key<'a>(
    parts: impl IntoIterator<Item = &'a ContentPart>,
    context: &str,
) -> Option<String> {
    batch_key(parts).map(|key| format!("{}{}{}", key, CONTEXT_MARKER, sha256_hex(context)))
}
