//! User suggestion list, loaded once at startup.

use std::path::Path;

use crate::error::{AppError, AppResult};

/// Normalized (trimmed, lower-cased) suggestions in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionList(Vec<String>);

impl SuggestionList {
    /// Build from raw entries; blank entries are dropped since they would match every option.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            entries
                .into_iter()
                .map(|s| normalize(s.as_ref()))
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    /// Parse one suggestion per line; `#` starts a comment line.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().filter(|line| !line.trim_start().starts_with('#')))
    }

    /// Read the suggestion source. Any failure is a configuration error.
    pub async fn load(path: &Path) -> AppResult<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::Config(format!("suggestions {}: {}", path.display(), e))
        })?;
        Ok(Self::from_text(&text))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Case- and surrounding-whitespace-insensitive form used on both sides of matching.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_normalizes_and_skips_blanks() {
        let list = SuggestionList::from_text("  Pizza \n\n# comment\nTACOS\n   \n");
        assert_eq!(list.iter().collect::<Vec<_>>(), ["pizza", "tacos"]);
    }

    #[test]
    fn keeps_duplicates_in_order() {
        let list = SuggestionList::new(["b", "a", "B"]);
        assert_eq!(list.iter().collect::<Vec<_>>(), ["b", "a", "b"]);
    }

    #[tokio::test]
    async fn load_missing_file_is_config_error() {
        let err = SuggestionList::load(Path::new("/nonexistent/tkvote/suggestions.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.txt");
        std::fs::write(&path, "Dogs\ncats\n").unwrap();
        let list = SuggestionList::load(&path).await.unwrap();
        assert_eq!(list.len(), 2);
    }
}
