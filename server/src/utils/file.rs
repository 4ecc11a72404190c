//! File utility functions

use std::path::{Path, PathBuf};

/// Expand a path string to an absolute path.
///
/// Handles `~` and `~/path` via the home directory, and resolves relative
/// paths (including bare names) against the current working directory.
/// Absolute paths are returned unchanged.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    }

    let expanded = if path == "~" {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(path))
    } else if let Some(rest) = path.strip_prefix("~/") {
        match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        }
    } else {
        PathBuf::from(path)
    };

    if expanded.is_relative() {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    } else {
        expanded
    }
}

/// Resolve a stored resource file path against the uploads directory.
///
/// Stored paths are relative to the uploads root. Absolute paths and any
/// path that climbs out of the root are rejected.
pub fn resolve_upload_path(uploads_dir: &Path, stored: &str) -> Option<PathBuf> {
    let relative = Path::new(stored.trim());
    if stored.trim().is_empty() || relative.is_absolute() {
        return None;
    }
    let escapes = relative.components().any(|c| {
        !matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir)
    });
    if escapes {
        return None;
    }
    Some(uploads_dir.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_absolute_unix() {
        let result = expand_path("/absolute/path");
        assert_eq!(result, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_expand_path_bare_name() {
        let result = expand_path("edushare.db");
        assert!(result.is_absolute());
        assert!(result.ends_with("edushare.db"));
    }

    #[test]
    fn test_expand_path_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/.edushare"), home.join(".edushare"));
        }
    }

    #[test]
    fn test_expand_path_empty_is_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("   "), cwd);
    }

    #[test]
    fn test_resolve_upload_path_relative() {
        let root = Path::new("/srv/uploads");
        assert_eq!(
            resolve_upload_path(root, "2024/worksheet.pdf"),
            Some(PathBuf::from("/srv/uploads/2024/worksheet.pdf"))
        );
    }

    #[test]
    fn test_resolve_upload_path_rejects_escape() {
        let root = Path::new("/srv/uploads");
        assert_eq!(resolve_upload_path(root, "../etc/passwd"), None);
        assert_eq!(resolve_upload_path(root, "/etc/passwd"), None);
        assert_eq!(resolve_upload_path(root, ""), None);
    }
}
