/*!
 * Utility functions for coursesync
 */

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Make a remote name safe to use as a single path segment.
///
/// Separators become `_`, and names that would not create a child entry
/// (`""`, `.`, `..`) become `_`.
pub fn sanitize_segment(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        return "_".to_string();
    }

    trimmed
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// Shorten a name for progress display, keeping its tail
pub fn truncate_name(name: &str, max_chars: usize) -> String {
    let count = name.chars().count();
    if count <= max_chars {
        return name.to_string();
    }

    let keep = max_chars.saturating_sub(3);
    let tail: String = name.chars().skip(count - keep).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("Week 1"), "Week 1");
        assert_eq!(sanitize_segment("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_segment(".."), "_");
        assert_eq!(sanitize_segment("  "), "_");
        assert_eq!(sanitize_segment(" Lecture.pdf "), "Lecture.pdf");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short.pdf", 40), "short.pdf");
        let long = "x".repeat(50);
        let shortened = truncate_name(&long, 40);
        assert_eq!(shortened.chars().count(), 40);
        assert!(shortened.starts_with("..."));
        assert_eq!(truncate_name("ééééé", 4), "...é");
    }
}
