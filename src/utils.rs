use std::path::Path;

/// Display a path relative to `base`, or just the file name if outside.
/// Keeps full system paths out of operator output.
pub fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| {
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "[path]".to_string())
        })
}

/// Truncate a string safely by character count, not byte count.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

/// Fixed-width text progress bar, e.g. `[#####-----]` for 50%.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let ratio = (percent / 100.0).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_display_path_within_base() {
        let base = PathBuf::from("/home/user/project");
        let path = PathBuf::from("/home/user/project/.annotrack/exports/a.zip");
        assert_eq!(display_path(&path, &base), ".annotrack/exports/a.zip");
    }

    #[test]
    fn test_display_path_outside_base() {
        let base = PathBuf::from("/home/user/project");
        let path = PathBuf::from("/etc/passwd");
        assert_eq!(display_path(&path, &base), "passwd");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("12345", 5), "12345");
        assert_eq!(truncate("hello", 2), "...");
    }

    #[test]
    fn test_truncate_utf8() {
        let result = truncate("Größe der Abbildung", 8);
        assert_eq!(result, "Größe...");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "[----]");
        assert_eq!(progress_bar(50.0, 4), "[##--]");
        assert_eq!(progress_bar(100.0, 4), "[####]");
        assert_eq!(progress_bar(250.0, 4), "[####]");
    }
}
