//! Human-readable size formatting and parsing.

use crate::utils::errors::CompressError;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count as a human-readable string (e.g. "1.50 MB").
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} PB", size)
}

/// Parse a human-readable size string (e.g. "100M", "1.5G", "512KB") to bytes.
///
/// Accepted suffixes are K, M, G, T with an optional trailing B,
/// case-insensitive. A bare number is taken as bytes.
pub fn parse_size(input: &str) -> crate::Result<u64> {
    let normalized = input.trim().to_ascii_uppercase();
    let digits_end = normalized
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(normalized.len());
    let (number, suffix) = normalized.split_at(digits_end);

    let value: f64 = number.parse().map_err(|_| invalid(input))?;

    let multiplier: f64 = match suffix.trim_start() {
        "" | "B" => 1.0,
        "K" | "KB" => 1024.0,
        "M" | "MB" => 1024.0 * 1024.0,
        "G" | "GB" => 1024.0 * 1024.0 * 1024.0,
        "T" | "TB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return Err(invalid(input)),
    };

    Ok((value * multiplier) as u64)
}

fn invalid(input: &str) -> CompressError {
    CompressError::Validation(format!("Invalid size format: {}", input))
}
