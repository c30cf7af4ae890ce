use std::path::{Path, PathBuf};

/// An exact location in the source code, showing exactly where an AST node
/// came from.
///
/// Nodes synthesized by the compiler carry the distinguished
/// [`SourceLoc::nonexistent`] value; diagnostics silently drop underlines
/// pointing at it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceLoc {
    raw: String,
    line: u64,
    column: u64,
    file: PathBuf,
}

impl SourceLoc {
    /// Creates a location from the raw text of a node and its position.
    pub fn new(
        raw: impl Into<String>,
        line: u64,
        column: u64,
        file: impl Into<PathBuf>,
    ) -> SourceLoc {
        SourceLoc {
            raw: raw.into(),
            line,
            column,
            file: file.into(),
        }
    }

    /// The location used for every compiler-synthesized node.
    pub fn nonexistent() -> SourceLoc {
        SourceLoc {
            raw: String::new(),
            line: 0,
            column: 0,
            file: PathBuf::new(),
        }
    }

    pub fn is_nonexistent(&self) -> bool {
        self.line == 0
    }

    /// The full raw text of the node.
    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    /// The 1-based line the node starts at.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The 1-based column the node starts at.
    pub fn column(&self) -> u64 {
        self.column
    }

    /// The length of the underlined region, in bytes of source text.
    pub fn length(&self) -> usize {
        self.raw.len()
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl Default for SourceLoc {
    fn default() -> Self {
        SourceLoc::nonexistent()
    }
}

#[cfg(test)]
mod tests {
    use super::SourceLoc;

    #[test]
    fn test_nonexistent() {
        assert!(SourceLoc::nonexistent().is_nonexistent());
        assert!(SourceLoc::default().is_nonexistent());
        assert!(!SourceLoc::new("let x = 0", 3, 5, "main.ga").is_nonexistent());
    }

    #[test]
    fn test_length_tracks_raw_text() {
        let loc = SourceLoc::new("while true", 1, 1, "main.ga");
        assert_eq!(loc.length(), 10);
        assert_eq!(loc.raw_text(), "while true");
    }
}
