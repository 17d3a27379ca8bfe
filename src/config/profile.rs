//! Shell profile scraping for credentials exported outside the server's environment.
//!
//! MCP hosts often launch servers without sourcing the user's shell profile, so an
//! `export GOOGLE_API_KEY=...` line in `~/.zshrc` never reaches the process.

use crate::best_effort;
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Finds `export NAME=value` assignments in shell profile files.
pub struct ProfileScanner {
    assignment_regex: Regex,
}

impl ProfileScanner {
    pub fn new() -> Self {
        let assignment_regex = Regex::new(
            r"(?x)
            ^\s*export\s+
            ([A-Za-z_][A-Za-z0-9_]*)   # variable name
            \s*=\s*
            (.*?)                      # raw value
            \s*$
        ",
        )
        .expect("Invalid regex");

        Self { assignment_regex }
    }

    /// Parse a single line, returning the value if it exports `name`.
    pub fn parse_line(&self, line: &str, name: &str) -> Option<String> {
        let caps = self.assignment_regex.captures(line)?;
        if caps.get(1)?.as_str() != name {
            return None;
        }

        let value = unquote(caps.get(2)?.as_str());
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Find the effective value of `name` in profile text. Later exports win.
    pub fn find_in(&self, content: &str, name: &str) -> Option<String> {
        content
            .lines()
            .filter_map(|line| self.parse_line(line, name))
            .last()
    }

    /// Read a profile file and look for `name`. Unreadable files count as "not found".
    pub fn scan_file(&self, path: &Path, name: &str) -> Option<String> {
        if !path.exists() {
            debug!("Profile {} does not exist", path.display());
            return None;
        }

        let content = best_effort::attempt(
            &format!("Reading shell profile {}", path.display()),
            std::fs::read_to_string(path),
        )?;

        self.find_in(&content, name)
    }
}

impl Default for ProfileScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip matching quotes, or a trailing `# comment` from an unquoted value.
fn unquote(raw: &str) -> String {
    let raw = raw.trim();

    for quote in ['"', '\''] {
        if let Some(rest) = raw.strip_prefix(quote) {
            return match rest.find(quote) {
                Some(end) => rest[..end].trim().to_string(),
                // Unterminated quote; take what is there.
                None => rest.trim().to_string(),
            };
        }
    }

    // `#` starts a comment only after whitespace, as in the shell
    let comment_start = raw
        .char_indices()
        .zip(raw.chars().skip(1))
        .find(|((_, c), next)| c.is_whitespace() && *next == '#')
        .map(|((idx, _), _)| idx);

    match comment_start {
        Some(idx) => raw[..idx].trim().to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_plain_export() {
        let scanner = ProfileScanner::new();
        assert_eq!(
            scanner.parse_line("export GOOGLE_API_KEY=abc123", "GOOGLE_API_KEY"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn test_parse_quoted_export() {
        let scanner = ProfileScanner::new();
        assert_eq!(
            scanner.parse_line(r#"  export GOOGLE_API_KEY="abc 123"  "#, "GOOGLE_API_KEY"),
            Some("abc 123".to_string())
        );
        assert_eq!(
            scanner.parse_line("export GOOGLE_API_KEY='xyz' # personal", "GOOGLE_API_KEY"),
            Some("xyz".to_string())
        );
    }

    #[test]
    fn test_parse_trailing_comment() {
        let scanner = ProfileScanner::new();
        assert_eq!(
            scanner.parse_line("export GOOGLE_API_KEY=abc # work key", "GOOGLE_API_KEY"),
            Some("abc".to_string())
        );
        assert_eq!(
            scanner.parse_line("export GOOGLE_API_KEY=abc\t# note", "GOOGLE_API_KEY"),
            Some("abc".to_string())
        );
        assert_eq!(
            scanner.parse_line("export GOOGLE_API_KEY=abc#def", "GOOGLE_API_KEY"),
            Some("abc#def".to_string())
        );
    }

    #[test]
    fn test_ignores_other_lines() {
        let scanner = ProfileScanner::new();
        assert_eq!(scanner.parse_line("export PATH=/usr/bin", "GOOGLE_API_KEY"), None);
        assert_eq!(scanner.parse_line("# export GOOGLE_API_KEY=abc", "GOOGLE_API_KEY"), None);
        assert_eq!(scanner.parse_line("GOOGLE_API_KEY=abc", "GOOGLE_API_KEY"), None);
        assert_eq!(scanner.parse_line("export GOOGLE_API_KEY=", "GOOGLE_API_KEY"), None);
        assert_eq!(scanner.parse_line("export GOOGLE_API_KEY_OLD=abc", "GOOGLE_API_KEY"), None);
    }

    #[test]
    fn test_last_export_wins() {
        let scanner = ProfileScanner::new();
        let content = "export GOOGLE_API_KEY=first\nalias ll='ls -l'\nexport GOOGLE_API_KEY=second\n";
        assert_eq!(
            scanner.find_in(content, "GOOGLE_API_KEY"),
            Some("second".to_string())
        );
    }

    #[test]
    fn test_scan_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "export GEMINI_API_KEY=\"from-profile\"").unwrap();

        let scanner = ProfileScanner::new();
        assert_eq!(
            scanner.scan_file(file.path(), "GEMINI_API_KEY"),
            Some("from-profile".to_string())
        );
        assert_eq!(scanner.scan_file(file.path(), "GOOGLE_API_KEY"), None);
    }

    #[test]
    fn test_scan_missing_file() {
        let scanner = ProfileScanner::new();
        assert_eq!(
            scanner.scan_file(Path::new("/definitely/not/here/.zshrc"), "GOOGLE_API_KEY"),
            None
        );
    }
}
