//! Mime types the classification model accepts.

pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "image/heif",
    "text/plain",
    "text/html",
    "text/csv",
];

/// Lower-case essence of a mime type, without parameters.
///
/// `"Text/Plain; charset=utf-8"` becomes `"text/plain"`.
pub fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn is_supported(mime_type: &str) -> bool {
    SUPPORTED_MIME_TYPES.contains(&essence(mime_type).as_str())
}

pub fn is_image(mime_type: &str) -> bool {
    essence(mime_type).starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_and_case_are_ignored() {
        assert_eq!(essence("Text/Plain; charset=utf-8"), "text/plain");
        assert!(is_supported("APPLICATION/PDF"));
        assert!(is_supported("text/csv;header=present"));
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(!is_supported("application/zip"));
        assert!(!is_supported(""));
        assert!(!is_supported("image/gif"));
    }

    #[test]
    fn image_detection() {
        assert!(is_image("image/png"));
        assert!(is_image("image/gif"));
        assert!(!is_image("application/pdf"));
    }
}
