//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;
use chrono::{DateTime, Utc};
use regex::Regex;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
    })
}

fn whitespace_regex() -> &'static Regex {
    static WS: OnceLock<Regex> = OnceLock::new();
    WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex is valid"))
}

/// Trim and lower-case an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email format
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Keep only the ASCII digits of a phone number
pub fn digits_only(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format a timestamp for exports
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

/// Replace every run of whitespace with a single underscore
pub fn underscore_whitespace(text: &str) -> String {
    whitespace_regex().replace_all(text.trim(), "_").into_owned()
}

/// Quote a CSV cell, doubling embedded quotes
pub fn csv_quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Sanitize a single path component for safe storage
pub fn sanitize_path_component(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Extract a lower-cased extension from a filename.
///
/// Returns `None` when the name has no extension or the extension is not a
/// short alphanumeric token.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() && !filename.starts_with('.') {
        return None;
    }
    let ext = ext.to_ascii_lowercase();
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("student@bnmit.in"));
        assert!(!is_valid_email("student.bnmit.in"));
        assert!(!is_valid_email("stu dent@bnmit.in"));
        assert_eq!(normalize_email("  Student@BNMIT.in "), "student@bnmit.in");
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("+91 98765-43210"), "919876543210");
        assert_eq!(digits_only("n/a"), "");
    }

    #[test]
    fn test_underscore_whitespace() {
        assert_eq!(underscore_whitespace("Tech  Fest 2025"), "Tech_Fest_2025");
        assert_eq!(underscore_whitespace(" Hack\tNight "), "Hack_Night");
    }

    #[test]
    fn test_csv_quote() {
        assert_eq!(csv_quote("plain"), "\"plain\"");
        assert_eq!(csv_quote("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_sanitize_path_component() {
        assert_eq!(sanitize_path_component("event-selfies"), "event-selfies");
        assert_eq!(sanitize_path_component("../../etc"), "______etc");
        assert_eq!(sanitize_path_component(".."), "_");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("selfie.JPG"), Some("jpg".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("weird.j/pg"), None);
    }

    #[test]
    fn test_format_timestamp() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 9, 5, 0).unwrap();
        assert_eq!(format_timestamp(ts), "2025-03-14 09:05");
    }
}
