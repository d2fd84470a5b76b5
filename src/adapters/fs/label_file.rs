use async_trait::async_trait;
use std::io::ErrorKind;
use tracing::warn;

use crate::application::ports::ClassTablePort;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::labels::ClassTable;

/// Reads class tables from plain text files, one label per line.
pub struct FileClassTableSource;

impl FileClassTableSource {
    pub fn new() -> Self { Self }
}

impl Default for FileClassTableSource {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl ClassTablePort for FileClassTableSource {
    async fn load_classes(&self, path: &str) -> DomainResult<ClassTable> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => DomainError::NotFound(format!("label file not found: {path}")),
            _ => DomainError::OperationFailed(format!("reading label file {path}: {e}")),
        })?;

        let table = ClassTable::from_lines(&text);
        if table.is_empty() {
            warn!("Label file {} is empty, every detection will be labelled Unknown", path);
        }
        Ok(table)
    }
}
