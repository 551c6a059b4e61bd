/// Sniff an upload's content type from its leading bytes, falling back to the
/// file extension when the bytes are not a recognised image format.
pub fn detect_content_type(bytes: &[u8], file_name: &str) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        _ => {
            let by_extension = content_type_for_extension(file_name);
            tracing::debug!(
                "Unrecognized leading bytes ({:02X?}) for {}, using {}",
                &bytes[..bytes.len().min(4)],
                file_name,
                by_extension
            );
            by_extension
        }
    }
}

fn content_type_for_extension(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        assert_eq!(
            detect_content_type(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A], "x.bin"),
            "image/png"
        );
    }

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(
            detect_content_type(&[0xFF, 0xD8, 0xFF, 0xE0], "photo"),
            "image/jpeg"
        );
    }

    #[test]
    fn test_detect_webp() {
        assert_eq!(
            detect_content_type(
                &[0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50],
                "beach"
            ),
            "image/webp"
        );
    }

    #[test]
    fn test_bytes_win_over_extension() {
        assert_eq!(
            detect_content_type(&[0x89, 0x50, 0x4E, 0x47], "mislabelled.jpg"),
            "image/png"
        );
    }

    #[test]
    fn test_unknown_bytes_fall_back_to_extension() {
        assert_eq!(detect_content_type(b"<svg", "logo.SVG"), "image/svg+xml");
        assert_eq!(
            detect_content_type(&[0x00, 0x01], "notes"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(detect_content_type(&[], ""), "application/octet-stream");
    }
}
