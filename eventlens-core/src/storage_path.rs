//! String helpers for object references stored in media rows.

use crate::media::MediaKind;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "webm", "avi", "mkv"];

/// Public URL prefix of objects in `bucket`, e.g.
/// `https://x.supabase.co/storage/v1/object/public/event-media/`
pub fn public_prefix(base_url: &str, bucket: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/",
        base_url.trim_end_matches('/'),
        bucket
    )
}

/// Turn a stored reference into a path relative to the bucket.
///
/// Strips the bucket's public prefix. References from another host fall back
/// to whatever follows the bucket segment, and anything else is assumed to be
/// relative already.
pub fn relative_path(reference: &str, prefix: &str, bucket: &str) -> String {
    if let Some(rest) = reference.strip_prefix(prefix) {
        return rest.to_string();
    }

    path_after_bucket(reference, bucket).unwrap_or_else(|| reference.to_string())
}

/// Everything after the first `/<bucket>/` segment of a URL.
pub fn path_after_bucket(url: &str, bucket: &str) -> Option<String> {
    let mut parts = url.split('/');
    parts.position(|part| part == bucket)?;

    let rest = parts.collect::<Vec<_>>().join("/");
    if rest.is_empty() { None } else { Some(rest) }
}

/// Lower-cased extension of the last path segment, ignoring any query string.
pub fn extension(reference: &str) -> Option<String> {
    let without_query = reference.split(['?', '#']).next().unwrap_or(reference);
    let file_name = without_query.rsplit('/').next()?;
    let (stem, ext) = file_name.rsplit_once('.')?;

    if stem.is_empty() || ext.is_empty() {
        return None;
    }

    Some(ext.to_ascii_lowercase())
}

/// Kind implied by a file extension, if it is on one of the allowlists.
pub fn kind_for_extension(ext: &str) -> Option<MediaKind> {
    let ext = ext.to_ascii_lowercase();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Photo)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Reclassify a stored item by its extension.
///
/// The extension wins over the stored kind; unknown extensions keep it.
pub fn classify(reference: &str, stored: MediaKind) -> MediaKind {
    extension(reference)
        .and_then(|ext| kind_for_extension(&ext))
        .unwrap_or(stored)
}

/// File name offered when a guest saves an item:
/// `<description or "download">.<extension of the signed URL>`
pub fn download_name(description: Option<&str>, signed_url: &str) -> String {
    let stem = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("download");
    let ext = extension(signed_url).unwrap_or_else(|| "file".to_string());

    format!("{stem}.{ext}")
}
