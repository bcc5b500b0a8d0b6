#![forbid(unsafe_code)]

//! Record addressing.
//!
//! A [`RecordPath`] names the location of one form record inside the store's
//! state tree, e.g. `"todos.newTodoForm"`. Segments are joined with `.` and
//! must be non-empty.
//!
//! # Invariants
//!
//! 1. A path always has at least one segment.
//! 2. No segment is empty (`"a..b"`, `".a"` and `"a."` are rejected).
//! 3. `RecordPath::parse(p.to_string()) == Ok(p)` for every valid path.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Errors from parsing a [`RecordPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path string was empty.
    Empty,
    /// The segment at `position` was empty.
    EmptySegment { position: usize },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "record path is empty"),
            Self::EmptySegment { position } => {
                write!(f, "record path has an empty segment at position {position}")
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Dotted address of a form record in the store's state tree.
///
/// ```
/// # use formsync_core::RecordPath;
/// let path = RecordPath::parse("todos.newTodoForm").unwrap();
/// assert_eq!(path.segments(), ["todos", "newTodoForm"]);
/// assert_eq!(path.to_string(), "todos.newTodoForm");
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordPath {
    segments: Vec<String>,
}

impl RecordPath {
    /// Parse a dotted path.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] when the string is empty or contains an empty
    /// segment.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }
        let segments = raw
            .split(SEPARATOR)
            .enumerate()
            .map(|(position, segment)| {
                if segment.is_empty() {
                    Err(PathError::EmptySegment { position })
                } else {
                    Ok(segment.to_owned())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// The individual segments, root first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for RecordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for RecordPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for RecordPath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RecordPath> for String {
    fn from(path: RecordPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_segment() {
        let path = RecordPath::parse("f").unwrap();
        assert_eq!(path.segments(), ["f"]);
        assert_eq!(path.to_string(), "f");
    }

    #[test]
    fn parse_nested() {
        let path: RecordPath = "todos.newTodoForm".parse().unwrap();
        assert_eq!(path.segments(), ["todos", "newTodoForm"]);
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(RecordPath::parse(""), Err(PathError::Empty));
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert_eq!(
            RecordPath::parse("a..b"),
            Err(PathError::EmptySegment { position: 1 })
        );
        assert_eq!(
            RecordPath::parse(".a"),
            Err(PathError::EmptySegment { position: 0 })
        );
        assert_eq!(
            RecordPath::parse("a."),
            Err(PathError::EmptySegment { position: 1 })
        );
    }

    #[test]
    fn serde_uses_dotted_string() {
        let path = RecordPath::parse("a.b").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"a.b\"");
        let back: RecordPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
        assert!(serde_json::from_str::<RecordPath>("\"\"").is_err());
    }

    #[test]
    fn error_display() {
        assert_eq!(PathError::Empty.to_string(), "record path is empty");
        assert!(
            PathError::EmptySegment { position: 2 }
                .to_string()
                .contains("position 2")
        );
    }
}
