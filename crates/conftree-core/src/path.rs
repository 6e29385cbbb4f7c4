//! Node path parsing for the hierarchical config store.
//!
//! Store paths are absolute, slash-separated strings like
//! `/server/activation/subscribers/acme`. A `NodePath` is the node
//! reference used throughout the store interface: every operation
//! addresses nodes by path rather than by handle.

use std::fmt;
use std::str::FromStr;

/// An absolute path to a node in the config store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath {
    /// The normalized path string (no trailing slash, root is "/")
    raw: String,
    /// Path segments split by '/'
    segments: Vec<String>,
}

impl NodePath {
    /// Parse an absolute path string.
    ///
    /// The path must start with `/`. A trailing slash is accepted and
    /// normalized away; empty segments (`//`) are rejected.
    pub fn new(path: &str) -> Result<Self, PathError> {
        if !path.starts_with('/') {
            return Err(PathError::NotAbsolute(path.to_string()));
        }

        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let mut segments = Vec::new();
        for segment in trimmed[1..].split('/') {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(path.to_string()));
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// The root path `/`.
    pub fn root() -> Self {
        Self {
            raw: "/".to_string(),
            segments: Vec::new(),
        }
    }

    /// Get the normalized path string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Get the path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The node name, i.e. the last segment. Empty for the root.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<NodePath> {
        if self.is_root() {
            return None;
        }
        let segments: Vec<String> = self.segments[..self.segments.len() - 1].to_vec();
        let raw = if segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", segments.join("/"))
        };
        Some(NodePath { raw, segments })
    }

    /// Append a child name to this path.
    ///
    /// The name is taken verbatim; it must be a single non-empty segment
    /// (the store validates names on `add_child`).
    pub fn join(&self, name: &str) -> NodePath {
        let raw = if self.is_root() {
            format!("/{}", name)
        } else {
            format!("{}/{}", self.raw, name)
        };
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        NodePath { raw, segments }
    }

    /// Check if this path is the given prefix or lies below it.
    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        if prefix.segments.len() > self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(prefix.segments.iter())
            .all(|(a, b)| a == b)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodePath::new(s)
    }
}

/// Errors that can occur when parsing a node path.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PathError {
    #[error("path is not absolute: {0}")]
    NotAbsolute(String),
    #[error("path contains an empty segment: {0}")]
    EmptySegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute() {
        let path = NodePath::new("/server/activation/subscribers").unwrap();
        assert_eq!(path.segments(), &["server", "activation", "subscribers"]);
        assert_eq!(path.as_str(), "/server/activation/subscribers");
        assert_eq!(path.name(), "subscribers");
    }

    #[test]
    fn test_trailing_slash_normalized() {
        let path = NodePath::new("/server/activation/subscribers/").unwrap();
        assert_eq!(path.as_str(), "/server/activation/subscribers");
    }

    #[test]
    fn test_relative_rejected() {
        assert!(matches!(
            NodePath::new("server/activation"),
            Err(PathError::NotAbsolute(_))
        ));
    }

    #[test]
    fn test_empty_segment_rejected() {
        assert!(matches!(
            NodePath::new("/server//activation"),
            Err(PathError::EmptySegment(_))
        ));
    }

    #[test]
    fn test_root() {
        let root = NodePath::new("/").unwrap();
        assert!(root.is_root());
        assert_eq!(root.as_str(), "/");
        assert_eq!(root.name(), "");
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_parent_and_join() {
        let path = NodePath::new("/server/activation").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.as_str(), "/server");
        assert_eq!(parent.parent().unwrap().as_str(), "/");

        let child = path.join("subscribers");
        assert_eq!(child.as_str(), "/server/activation/subscribers");
        assert_eq!(child.parent().unwrap(), path);

        let from_root = NodePath::root().join("server");
        assert_eq!(from_root.as_str(), "/server");
    }

    #[test]
    fn test_starts_with() {
        let base = NodePath::new("/server/activation").unwrap();
        let deep = NodePath::new("/server/activation/subscribers/acme").unwrap();
        assert!(deep.starts_with(&base));
        assert!(base.starts_with(&base));
        assert!(!base.starts_with(&deep));

        let other = NodePath::new("/server/filters").unwrap();
        assert!(!deep.starts_with(&other));
    }
}
