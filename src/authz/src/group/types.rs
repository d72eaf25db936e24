/// Group path type definitions and validation
///
/// Provides the `GroupPath` value type: a validated, slash-separated
/// path into the group tree with parent and ancestor navigation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result type for group path operations
pub type GroupResult<T> = Result<T, GroupError>;

/// Errors that can occur while parsing a group path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// Empty path string provided
    EmptyPath,
    /// Path does not start with '/'
    NotAbsolute(String),
    /// Path contains an empty segment ("//")
    EmptySegment(String),
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "Group path cannot be empty"),
            Self::NotAbsolute(path) => write!(f, "Group path must start with '/': '{}'", path),
            Self::EmptySegment(path) => write!(f, "Group path has an empty segment: '{}'", path),
        }
    }
}

impl std::error::Error for GroupError {}

/// Hierarchical group path
///
/// The root group is `/`; every other group has exactly one parent
/// obtained by dropping the last segment:
/// - `/org/finance` → `/org` → `/`
///
/// # Examples
///
/// ```
/// use idm_authz::group::GroupPath;
///
/// let group = GroupPath::new("/org/finance").unwrap();
/// assert_eq!(group.parent().unwrap().as_str(), "/org");
/// assert_eq!(group.ancestors().count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GroupPath {
    /// Normalized path string
    raw: String,
}

impl GroupPath {
    /// Creates a new group path
    ///
    /// A single trailing '/' is dropped, so `/org/` and `/org` are the
    /// same group.
    pub fn new(s: &str) -> GroupResult<Self> {
        if s.is_empty() {
            return Err(GroupError::EmptyPath);
        }
        if !s.starts_with('/') {
            return Err(GroupError::NotAbsolute(s.to_string()));
        }
        if s == "/" {
            return Ok(Self::root());
        }

        let trimmed = s.strip_suffix('/').unwrap_or(s);
        if trimmed[1..].split('/').any(str::is_empty) {
            return Err(GroupError::EmptySegment(s.to_string()));
        }

        Ok(Self {
            raw: trimmed.to_string(),
        })
    }

    /// The root group `/`
    pub fn root() -> Self {
        Self {
            raw: "/".to_string(),
        }
    }

    /// Parses an optional path, defaulting to root
    pub fn or_root(path: Option<&str>) -> GroupResult<Self> {
        match path {
            Some(p) => Self::new(p),
            None => Ok(Self::root()),
        }
    }

    /// Returns the path string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this is the root group
    pub fn is_root(&self) -> bool {
        self.raw == "/"
    }

    /// Returns the path segments (empty for root)
    pub fn segments(&self) -> Vec<&str> {
        if self.is_root() {
            Vec::new()
        } else {
            self.raw[1..].split('/').collect()
        }
    }

    /// Number of segments below root
    pub fn depth(&self) -> usize {
        self.segments().len()
    }

    /// Returns the parent group, or `None` for root
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }

        match self.raw.rfind('/') {
            Some(0) | None => Some(Self::root()),
            Some(idx) => Some(Self {
                raw: self.raw[..idx].to_string(),
            }),
        }
    }

    /// Iterates over this group and each of its parents, ending with root
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }

    /// Whether this group is a strict ancestor of another
    pub fn is_ancestor_of(&self, other: &GroupPath) -> bool {
        if self == other {
            return false;
        }
        if self.is_root() {
            return true;
        }
        other
            .raw
            .strip_prefix(self.raw.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Whether this group is a strict descendant of another
    pub fn is_descendant_of(&self, other: &GroupPath) -> bool {
        other.is_ancestor_of(self)
    }
}

/// Iterator returned by [`GroupPath::ancestors`]
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<GroupPath>,
}

impl Iterator for Ancestors {
    type Item = GroupPath;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

impl Default for GroupPath {
    fn default() -> Self {
        Self::root()
    }
}

impl FromStr for GroupPath {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for GroupPath {
    type Error = GroupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<GroupPath> for String {
    fn from(group: GroupPath) -> Self {
        group.raw
    }
}

impl fmt::Display for GroupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
