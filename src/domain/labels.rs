use serde::{Deserialize, Serialize};

use super::detection::UNKNOWN_LABEL;

/// Ordered class names; the position of a label is its class identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassTable {
    labels: Vec<String>,
}

impl ClassTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// One label per line. Blank lines are kept so indices line up with the file.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines().map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Label for a (possibly negative) class index, `"Unknown"` when out of range.
    pub fn label_for(&self, index: i64) -> &str {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.get(i))
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ClassTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
