//! Path, size and file-type utilities

use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Category;

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Relative path as a forward-slash string (portable catalog/listing paths).
pub fn path_to_listing_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Check if a file should be excluded based on OS-specific hidden files
pub fn is_os_hidden_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            // macOS
            ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
            // Windows
            "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" => true,
            // Linux
            ".directory" => true,
            _ => name.starts_with("._") || name.starts_with(".Trash-"),
        }
    } else {
        false
    }
}

/// Lower-case extension with leading dot (`"Pack.UnityPackage"` -> `".unitypackage"`), or empty.
pub fn detect_file_type(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Category from extension first, then from keywords in the name. Rules are checked in order.
pub fn detect_category(name: &str) -> Category {
    let lower = name.to_lowercase();
    let ext = detect_file_type(name);
    let ext = ext.as_str();

    if matches!(ext, ".unitypackage" | ".unity") || lower.contains("unity") {
        Category::UnityAssets
    } else if matches!(ext, ".exe" | ".msi" | ".dmg" | ".pkg" | ".deb" | ".rpm") {
        Category::SoftwareTools
    } else if matches!(ext, ".psd" | ".ai" | ".sketch" | ".fig" | ".svg") || lower.contains("ui") {
        Category::DesignAssets
    } else if matches!(ext, ".mp4" | ".avi" | ".mov" | ".wmv" | ".flv" | ".mkv")
        || lower.contains("course")
    {
        Category::VideoCourses
    } else if matches!(ext, ".mp3" | ".wav" | ".flac" | ".aac" | ".m4a") {
        Category::AudioResources
    } else if matches!(
        ext,
        ".pdf" | ".epub" | ".mobi" | ".azw" | ".azw3" | ".doc" | ".docx"
    ) {
        Category::Documents
    } else if matches!(ext, ".fbx" | ".obj" | ".3ds" | ".blend" | ".max" | ".c4d") {
        Category::Models3d
    } else if matches!(ext, ".zip" | ".rar" | ".7z" | ".tar" | ".gz") {
        Category::Archives
    } else {
        Category::Unknown
    }
}

/// MIME type for an upload, from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "rar" => "application/x-rar-compressed",
        "7z" => "application/x-7z-compressed",
        "txt" => "text/plain",
        "json" => "application/json",
        "xml" => "application/xml",
        "mp4" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// True for files the media stage treats as images.
pub fn is_image_file(path: &Path) -> bool {
    content_type_for(path).starts_with("image/")
}

/// Target platform of an installer, when the extension implies one.
pub fn platform_hint(file_type: &str) -> Option<&'static str> {
    match file_type {
        ".exe" | ".msi" => Some("Windows"),
        ".dmg" | ".pkg" | ".app" => Some("macOS"),
        ".deb" | ".rpm" => Some("Linux"),
        _ => None,
    }
}

/// Parse a human size such as `"5GB"`, `"512 MB"`, `"64kb"` or `"1024"` into bytes.
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let (digits, mult): (&str, u64) = if let Some(n) = s.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };
    let digits = digits.trim();
    if digits.is_empty() {
        bail!("empty size value");
    }
    let value: f64 = digits
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid size: {:?}", s))?;
    if !value.is_finite() || value < 0.0 {
        bail!("invalid size: {:?}", s);
    }
    Ok((value * mult as f64) as u64)
}

/// Format bytes for logs and summaries (`"1.50 GB"`).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

/// Replace path separators and control characters so `name` is safe as a single path component.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `"low-poly_shooter.zip"` -> `"Low Poly Shooter"`.
pub fn title_from_filename(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    stem.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Seconds since epoch (0 if the clock is before the epoch).
pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Modification time of `meta` in seconds since epoch.
pub fn modified_secs(meta: &std::fs::Metadata) -> i64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
