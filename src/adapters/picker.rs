use std::path::PathBuf;

use crate::domain::ports::FileSelector;
use crate::utils::validation::validate_file_extension;

#[derive(Debug, Clone, Copy)]
pub struct FileFilter {
    pub description: &'static str,
    pub extensions: &'static [&'static str],
}

pub const PDF_FILTER: FileFilter = FileFilter {
    description: "PDF files",
    extensions: &["pdf"],
};

/// Path-entry stand-in for a native "open file" dialog.
#[derive(Debug, Clone)]
pub struct DocumentPicker {
    filter: FileFilter,
}

impl DocumentPicker {
    pub fn new(filter: FileFilter) -> Self {
        Self { filter }
    }
}

impl Default for DocumentPicker {
    fn default() -> Self {
        Self::new(PDF_FILTER)
    }
}

impl FileSelector for DocumentPicker {
    fn select(&self, input: &str) -> Option<PathBuf> {
        // Terminals wrap dropped paths in quotes.
        let raw = input.trim().trim_matches(|c| c == '"' || c == '\'');
        if raw.is_empty() {
            return None;
        }

        if let Err(e) = validate_file_extension("document", raw, self.filter.extensions) {
            tracing::debug!("Rejected by {} filter: {}", self.filter.description, e);
            return None;
        }

        let path = PathBuf::from(raw);
        if !path.is_file() {
            tracing::debug!("Not a file: {}", path.display());
            return None;
        }

        Some(std::fs::canonicalize(&path).unwrap_or(path))
    }
}
