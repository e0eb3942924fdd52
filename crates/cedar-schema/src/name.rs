//! Module: name
//! Responsibility: identifier, path, entity-type and action-UID construction.
//! Does not own: scoping or qualification rules (those live in `resolve`).
//!
//! Invariants:
//! - Identifiers are non-empty and never contain the `::` separator.
//! - Paths are sequences of identifiers; the empty path is the global namespace.
//! - Entity types are never the empty path.

use crate::ThisError;
use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Path separator used by namespaces, entity types and rooted references.
pub const SEPARATOR: &str = "::";

/// Base name of the entity type every action UID lives under.
pub const ACTION_ENTITY_TYPE: &str = "Action";

///
/// NameError
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum NameError {
    #[error("identifier '{0}' contains the '::' separator")]
    ContainsSeparator(String),

    #[error("identifier is empty")]
    Empty,

    #[error("entity type name is empty")]
    EmptyEntityType,

    #[error("path '{0}' has an empty segment")]
    EmptySegment(String),
}

///
/// Identifier
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();

        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.contains(SEPARATOR) {
            return Err(NameError::ContainsSeparator(name));
        }

        Ok(Self(name))
    }

    // only for crate-owned constants that are known to be valid
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(!name.is_empty() && !name.contains(SEPARATOR));

        Self(name.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identifier {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identifier {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(ident: Identifier) -> Self {
        ident.0
    }
}

///
/// Path
///
/// `::`-separated identifier sequence. A path written with a leading `::` is
/// *rooted*: it names something in the global namespace and is never
/// re-qualified by the enclosing namespace.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
    segments: Vec<Identifier>,
    rooted: bool,
}

impl Path {
    /// The global (unnamed) namespace.
    #[must_use]
    pub const fn global() -> Self {
        Self {
            segments: Vec::new(),
            rooted: false,
        }
    }

    /// Parse `A::B::C`, `::A`, or the empty string (global).
    pub fn parse(s: &str) -> Result<Self, NameError> {
        if s.is_empty() {
            return Ok(Self::global());
        }

        let (rooted, rest) = match s.strip_prefix(SEPARATOR) {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let segments = rest
            .split(SEPARATOR)
            .map(|segment| {
                Identifier::new(segment).map_err(|_| NameError::EmptySegment(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments, rooted })
    }

    #[must_use]
    pub fn from_segments(segments: impl IntoIterator<Item = Identifier>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
            rooted: false,
        }
    }

    #[must_use]
    pub fn from_ident(ident: Identifier) -> Self {
        Self {
            segments: vec![ident],
            rooted: false,
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[Identifier] {
        &self.segments
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub const fn is_rooted(&self) -> bool {
        self.rooted
    }

    /// A path is qualified when it has more than one segment or is rooted.
    #[must_use]
    pub const fn is_qualified(&self) -> bool {
        self.rooted || self.segments.len() > 1
    }

    /// Last segment, if any.
    #[must_use]
    pub fn basename(&self) -> Option<&Identifier> {
        self.segments.last()
    }

    /// Every segment but the last, as an unrooted path.
    #[must_use]
    pub fn namespace(&self) -> Self {
        let len = self.segments.len().saturating_sub(1);

        Self::from_segments(self.segments[..len].iter().cloned())
    }

    /// Append a child segment.
    #[must_use]
    pub fn join(&self, child: Identifier) -> Self {
        let mut segments = self.segments.clone();
        segments.push(child);

        Self {
            segments,
            rooted: self.rooted,
        }
    }

    /// Drop the root marker.
    #[must_use]
    pub fn unrooted(&self) -> Self {
        Self::from_segments(self.segments.iter().cloned())
    }

    /// Mark the path as rooted at the global namespace.
    #[must_use]
    pub fn into_rooted(mut self) -> Self {
        self.rooted = true;
        self
    }

    /// True when this path's segments are exactly `prefix` followed by one
    /// more segment.
    #[must_use]
    pub fn is_direct_child_of(&self, prefix: &Self) -> bool {
        self.segments.len() == prefix.segments.len() + 1
            && self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rooted {
            f.write_str(SEPARATOR)?;
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(SEPARATOR)?;
            }
            f.write_str(segment)?;
        }

        Ok(())
    }
}

impl FromStr for Path {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Path {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Path {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

impl From<Identifier> for Path {
    fn from(ident: Identifier) -> Self {
        Self::from_ident(ident)
    }
}

///
/// EntityType
///
/// A non-empty path used as a type name (`User`, `App::User`, `::User`).
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct EntityType(Path);

impl EntityType {
    pub fn new(path: Path) -> Result<Self, NameError> {
        if path.is_global() {
            return Err(NameError::EmptyEntityType);
        }

        Ok(Self(path))
    }

    pub fn parse(s: &str) -> Result<Self, NameError> {
        Self::new(Path::parse(s)?)
    }

    /// `<namespace>::<name>`, or just `<name>` in the global namespace.
    #[must_use]
    pub fn in_namespace(namespace: &Path, name: Identifier) -> Self {
        Self(namespace.unrooted().join(name))
    }

    /// `::<name>`: a global name that is never re-qualified.
    #[must_use]
    pub fn rooted(name: Identifier) -> Self {
        Self(Path::from_ident(name).into_rooted())
    }

    /// Entity type that action UIDs declared in `namespace` live under.
    #[must_use]
    pub fn action_in(namespace: &Path) -> Self {
        Self::in_namespace(namespace, Identifier::from_static(ACTION_ENTITY_TYPE))
    }

    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.0
    }

    #[must_use]
    pub fn into_path(self) -> Path {
        self.0
    }

    /// Same name with the root marker removed.
    #[must_use]
    pub fn unrooted(&self) -> Self {
        Self(self.0.unrooted())
    }
}

impl From<Identifier> for EntityType {
    fn from(ident: Identifier) -> Self {
        Self(Path::from_ident(ident))
    }
}

impl FromStr for EntityType {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EntityType {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for EntityType {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<EntityType> for String {
    fn from(ty: EntityType) -> Self {
        ty.0.to_string()
    }
}

///
/// ActionUid
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ActionUid {
    #[serde(rename = "type")]
    pub ty: EntityType,
    pub id: String,
}

impl ActionUid {
    #[must_use]
    pub fn new(ty: EntityType, id: impl Into<String>) -> Self {
        Self { ty, id: id.into() }
    }

    /// UID of an action named `id` declared inside `namespace`.
    #[must_use]
    pub fn in_namespace(namespace: &Path, id: impl Into<String>) -> Self {
        Self::new(EntityType::action_in(namespace), id)
    }

    /// Namespace the action was declared in.
    #[must_use]
    pub fn namespace(&self) -> Path {
        self.ty.namespace()
    }
}

impl fmt::Display for ActionUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::\"{}\"", self.ty, self.id.escape_debug())
    }
}

///
/// TESTS
///
