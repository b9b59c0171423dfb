//! Slash-delimited path values with structural `.` and `..` segments.

use std::fmt;

/// Errors related to path interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A file operation was given a path with no usable leaf segment.
    MissingLeaf,

    /// The final segment of a file path is a traversal directive, not a name.
    DirectiveLeaf { segment: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::MissingLeaf => {
                write!(f, "a file name is required but the path has no segments")
            }
            PathError::DirectiveLeaf { segment } => {
                write!(f, "'{}' is a traversal directive, not a file name", segment)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// One parsed path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `.` - stay at the current directory.
    Current,
    /// `..` - move to the parent directory.
    Parent,
    /// Any other segment: a directory or file name.
    Name(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Current => write!(f, "."),
            Segment::Parent => write!(f, ".."),
            Segment::Name(name) => write!(f, "{}", name),
        }
    }
}

/// A parsed slash-delimited path.
///
/// Empty segments are dropped during parsing, so `""`, `"/"`, `"a//b"` and
/// `"a/b/"` all normalize the way `"a/b"` does. `.` and `..` are kept as
/// structural directives rather than literal names; everything else is an
/// opaque name for the backend to interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Parse a path string.
    ///
    /// Parsing never fails: normalization only drops empty segments. Whether
    /// the path is *usable* for a given operation (e.g. whether it has a
    /// leaf name) is checked by the operation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use originfs_fs::Path;
    ///
    /// assert_eq!(Path::parse("a//b/"), Path::parse("a/b"));
    /// assert_eq!(Path::parse("/a/b"), Path::parse("a/b"));
    /// assert!(Path::parse("/").is_root());
    /// ```
    pub fn parse(s: &str) -> Self {
        let segments = s
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| match part {
                "." => Segment::Current,
                ".." => Segment::Parent,
                name => Segment::Name(name.to_string()),
            })
            .collect();

        Path { segments }
    }

    /// Whether this path addresses the root (no segments at all).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The parsed segments, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Split into directory part and leaf file name.
    ///
    /// The final segment is treated as a file name, never as a traversal
    /// step, so it must be a plain [`Segment::Name`]. A root-only path has
    /// no leaf to give.
    pub fn split_leaf(&self) -> Result<(Path, &str), PathError> {
        let (leaf, dir_segments) = match self.segments.split_last() {
            Some(split) => split,
            None => return Err(PathError::MissingLeaf),
        };

        let name = match leaf {
            Segment::Name(name) => name.as_str(),
            directive => {
                return Err(PathError::DirectiveLeaf {
                    segment: directive.to_string(),
                })
            }
        };

        Ok((
            Path {
                segments: dir_segments.to_vec(),
            },
            name,
        ))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_segments_are_dropped() {
        let expected = Path::parse("a/b");
        assert_eq!(Path::parse("/a/b"), expected);
        assert_eq!(Path::parse("a//b"), expected);
        assert_eq!(Path::parse("a/b/"), expected);
        assert_eq!(Path::parse("//a///b//"), expected);
    }

    #[test]
    fn root_forms() {
        assert!(Path::parse("").is_root());
        assert!(Path::parse("/").is_root());
        assert!(Path::parse("///").is_root());
        assert!(!Path::parse("a").is_root());
    }

    #[test]
    fn dot_segments_are_directives() {
        let path = Path::parse("./a/../b");
        assert_eq!(
            path.segments(),
            &[
                Segment::Current,
                Segment::Name("a".to_string()),
                Segment::Parent,
                Segment::Name("b".to_string()),
            ]
        );
    }

    #[test]
    fn split_leaf_works() {
        let path = Path::parse("/cool/what/do/you/mean.js");
        let (dir, leaf) = path.split_leaf().unwrap();
        assert_eq!(leaf, "mean.js");
        assert_eq!(dir, Path::parse("cool/what/do/you"));
    }

    #[test]
    fn split_leaf_single_segment() {
        let path = Path::parse("f.txt");
        let (dir, leaf) = path.split_leaf().unwrap();
        assert!(dir.is_root());
        assert_eq!(leaf, "f.txt");
    }

    #[test]
    fn split_leaf_rejects_root() {
        assert_eq!(Path::parse("/").split_leaf(), Err(PathError::MissingLeaf));
    }

    #[test]
    fn split_leaf_rejects_directives() {
        assert!(matches!(
            Path::parse("a/..").split_leaf(),
            Err(PathError::DirectiveLeaf { .. })
        ));
        assert!(matches!(
            Path::parse("a/.").split_leaf(),
            Err(PathError::DirectiveLeaf { .. })
        ));
    }

    #[test]
    fn display_round_trips() {
        assert_eq!(Path::parse("a/b/c").to_string(), "a/b/c");
        assert_eq!(Path::parse("/").to_string(), "/");
        assert_eq!(Path::parse("../x").to_string(), "../x");
    }
}
