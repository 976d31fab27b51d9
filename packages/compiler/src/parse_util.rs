//! Parse Utilities
//!
//! Source locations attached to declarations and annotations by the external
//! annotation extractor. Lines and columns are 1-based, exactly as reported.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ParseLocation {
    pub file: String,
    #[serde(default)]
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(file: impl Into<String>, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation {
            file: file.into(),
            offset,
            line,
            col,
        }
    }

    /// Moves the location forward over `text`, tracking newlines.
    pub fn advance(&self, text: &str) -> ParseLocation {
        let mut line = self.line;
        let mut col = self.col;
        for ch in text.chars() {
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        ParseLocation::new(self.file.clone(), self.offset + text.len(), line, col)
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan {
            start,
            end,
            details: None,
        }
    }

    /// A zero-width span at `line:col`.
    pub fn point(file: impl Into<String>, line: usize, col: usize) -> Self {
        let loc = ParseLocation::new(file, 0, line, col);
        ParseSourceSpan::new(loc.clone(), loc)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn file(&self) -> &str {
        &self.start.file
    }

    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for ParseSourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        if let Some(details) = &self.details {
            write!(f, ", {}", details)?;
        }
        Ok(())
    }
}
