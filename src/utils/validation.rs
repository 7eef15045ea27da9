use anyhow::{Result, anyhow};
use std::path::Path;

/// Allowed MIME types for catalog images
pub const ALLOWED_IMAGE_MIMES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Extension used when an uploaded filename carries none
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub fn is_allowed_image_mime(content_type: &str) -> bool {
    let normalized = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    ALLOWED_IMAGE_MIMES.iter().any(|&allowed| allowed == normalized)
}

/// Validates a declared content type against the image allowlist
pub fn validate_image_mime(content_type: &str) -> Result<()> {
    if is_allowed_image_mime(content_type) {
        return Ok(());
    }

    Err(anyhow!(ValidationError {
        code: "UNSUPPORTED_MEDIA_TYPE",
        message: format!(
            "Content type '{}' is not allowed. Only JPEG, PNG and WebP images are permitted.",
            content_type
        ),
    }))
}

/// Extracts the trailing filename component of a reference path.
///
/// Both `/` and `\` count as separators. Empty names, `.`, `..` and
/// names containing NUL are rejected so a caller can never be steered
/// outside its storage directory.
pub fn safe_file_name(path: &str) -> Result<&str> {
    let name = path.rsplit(['/', '\\']).next().unwrap_or("");

    if name.is_empty() || name == "." || name == ".." {
        return Err(anyhow!(ValidationError {
            code: "INVALID_PATH",
            message: format!("Path '{}' has no usable filename component", path),
        }));
    }

    if name.contains('\0') {
        return Err(anyhow!(ValidationError {
            code: "INVALID_PATH",
            message: "Filename contains a NUL byte".to_string(),
        }));
    }

    Ok(name)
}

/// Derives a storage extension from the uploaded filename.
///
/// Lowercased, stripped to ASCII alphanumerics and capped at 8 chars;
/// falls back to the default image extension when nothing usable remains.
pub fn file_extension(filename: &str) -> String {
    let ext: String = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect::<String>()
        .to_lowercase();

    if ext.is_empty() {
        DEFAULT_IMAGE_EXTENSION.to_string()
    } else {
        ext
    }
}

/// Turns a display name into a URL slug: lowercase, whitespace to single
/// hyphens, punctuation dropped, hyphens collapsed and trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.trim().to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        } else if c.is_alphanumeric() || c == '_' {
            slug.push(c);
        }
    }

    slug.trim_end_matches('-').to_string()
}
