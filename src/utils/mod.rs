//! Utility functions and helpers.

pub mod url;

/// Characters that are unsafe in directory and file names.
const INVALID_NAME_CHARS: [char; 8] = ['<', '>', ':', '"', '/', '\\', '|', '?'];

/// Sanitize a path component for the local filesystem.
///
/// Invalid characters become underscores; spacing is kept as-is. Used for
/// course and section directories, which carry display names.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if INVALID_NAME_CHARS.contains(&c) || c == '*' {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Slug a display name for anchor directories and member filenames.
///
/// Whitespace runs become single dashes, invalid characters underscores.
///
/// # Examples
/// ```
/// use ucsync::utils::slug;
///
/// assert_eq!(slug("Unix Exec"), "Unix-Exec");
/// assert_eq!(slug("  Tarea  1 "), "Tarea-1");
/// ```
pub fn slug(name: &str) -> String {
    let sanitized = sanitize_component(name);
    let parts: Vec<&str> = sanitized.split_whitespace().collect();

    if parts.is_empty() {
        "_".to_string()
    } else {
        parts.join("-")
    }
}

/// Split a display name into stem and extension.
///
/// Only short alphanumeric suffixes count as extensions, so names like
/// `"Clase 1.2"` stay intact.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    if let Some(idx) = name.rfind('.') {
        if idx > 0 && idx + 1 < name.len() {
            let ext = &name[idx + 1..];
            if ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
                && ext.chars().any(|c| c.is_ascii_alphabetic())
            {
                return (&name[..idx], Some(ext));
            }
        }
    }
    (name, None)
}

/// Lowercased extension of a display name or URL path, if any.
pub fn extension_of(name: &str) -> Option<String> {
    split_extension(name).1.map(|ext| ext.to_lowercase())
}
