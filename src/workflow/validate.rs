//! Pre-upload checks and helpers for the staged artifact.

use base64::Engine;

use crate::error::ValidationError;
use crate::models::SelectedFile;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Accept `file` iff its declared type is an image and it is at most
/// `max_bytes` long. Type is checked first.
pub fn validate_file(file: &SelectedFile, max_bytes: u64) -> Result<(), ValidationError> {
    if !file.mime_type.starts_with("image/") {
        return Err(ValidationError::NotAnImage {
            mime_type: file.mime_type.clone(),
        });
    }
    let size_bytes = file.size_bytes();
    if size_bytes > max_bytes {
        return Err(ValidationError::TooLarge {
            size_bytes,
            max_bytes,
        });
    }
    Ok(())
}

/// Encode bytes as a `data:` URL usable as an inline preview.
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{encoded}")
}

/// Decode the payload of a base64 `data:` URL.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, String> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URL".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URL without payload".to_string())?;
    if !header.ends_with(";base64") {
        return Err(format!("unsupported data URL encoding: {header}"));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| format!("invalid base64 payload: {e}"))
}

/// Human-readable size with 1024 steps, e.g. `1.5 KB`, `10 MB`, `0 Bytes`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    fn file(mime: &str, len: usize) -> SelectedFile {
        SelectedFile::new("eye", mime, vec![0; len])
    }

    #[test]
    fn accepts_image_at_limit() {
        assert!(validate_file(&file("image/jpeg", MIB), 10 * MIB as u64).is_ok());
        assert!(validate_file(&file("image/png", 10 * MIB), 10 * MIB as u64).is_ok());
    }

    #[test]
    fn rejects_oversized_image() {
        let err = validate_file(&file("image/jpeg", 15 * MIB), 10 * MIB as u64).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLarge {
                size_bytes: 15 * MIB as u64,
                max_bytes: 10 * MIB as u64
            }
        );
    }

    #[test]
    fn type_checked_before_size() {
        let err = validate_file(&file("application/pdf", 15 * MIB), 10 * MIB as u64).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnImage { .. }));
    }

    #[test]
    fn data_url_decodes_back() {
        let url = data_url("image/png", b"\x89PNG");
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&url).unwrap(), b"\x89PNG");
    }

    #[test]
    fn decode_rejects_foreign_urls() {
        assert!(decode_data_url("https://bucket.example/eye.jpg").is_err());
        assert!(decode_data_url("data:text/plain,hello").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1023), "1023 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * MIB as u64), "10 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(3 * 1024 * MIB as u64), "3 GB");
    }
}
