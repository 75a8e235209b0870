// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve a potentially relative href against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Extract the host from a URL string.
///
/// # Examples
/// ```
/// use ucsync::utils::url::host_of;
///
/// assert_eq!(
///     host_of("https://www.u-cursos.cl/ingenieria/"),
///     Some("www.u-cursos.cl".to_string())
/// );
/// ```
pub fn host_of(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_lowercase()))
}

/// Extract the portal file/record id from a URL (looks for common patterns).
pub fn extract_file_id(url: &str) -> Option<String> {
    // Common patterns: ?id=123, ?id_archivo=123, /bajar/123
    let patterns = [
        regex::Regex::new(r"[?&](?:id|id_archivo|id_tarea|id_material)=(\d+)").ok()?,
        regex::Regex::new(r"/(?:bajar|archivo|detalle)/(\d+)").ok()?,
    ];

    for pattern in &patterns {
        if let Some(caps) = pattern.captures(url) {
            if let Some(id) = caps.get(1) {
                return Some(id.as_str().to_string());
            }
        }
    }
    None
}

/// Replace the final path segment of a URL, keeping the query string.
///
/// Returns `None` when the URL cannot be parsed or has no path segments.
pub fn with_last_segment(url_str: &str, segment: &str) -> Option<String> {
    let mut url = Url::parse(url_str).ok()?;
    {
        let mut segments = url.path_segments_mut().ok()?;
        segments.pop();
        segments.push(segment);
    }
    Some(url.to_string())
}
