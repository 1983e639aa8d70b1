//! Source reader: read a file into a UTF-8 buffer, tracking its filename for
//! diagnostics.

use crate::span::LineIndex;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub filename: Arc<str>,
    pub text: Arc<str>,
    line_index: Arc<LineIndex>,
}

impl SourceFile {
    #[must_use]
    pub fn new(filename: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let line_index = Arc::new(LineIndex::build(&text));
        Self {
            filename: filename.into(),
            text,
            line_index,
        }
    }

    /// Read a file from disk, validating it is UTF-8.
    ///
    /// # Errors
    /// Returns the underlying I/O error, or a UTF-8 decode error wrapped as
    /// an I/O error of kind `InvalidData`.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Self::new(path.to_string_lossy().into_owned(), text))
    }

    #[must_use]
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        self.line_index.line_col(offset)
    }

    #[must_use]
    pub fn byte(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(offset).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_tracks_across_newlines() {
        let sf = SourceFile::new("t.jsa", "var a;\nvar b;\n");
        assert_eq!(sf.line_col(0), (1, 1));
        assert_eq!(sf.line_col(7), (2, 1));
    }
}
