use crate::{
    name::{EntityType, Identifier},
    types::{Annotation, Annotations, RecordType, Type},
};
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// DeclKind
///
/// Declaration kinds in processing priority order: common types first so the
/// alias cache is warm, then entities, enums and actions.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum DeclKind {
    #[display("common type")]
    CommonType,
    #[display("entity")]
    Entity,
    #[display("enum entity")]
    Enum,
    #[display("action")]
    Action,
}

impl DeclKind {
    pub const PRIORITY: [Self; 4] = [Self::CommonType, Self::Entity, Self::Enum, Self::Action];
}

///
/// Declaration
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Declaration {
    CommonType(CommonTypeDecl),
    Entity(EntityDecl),
    Enum(EnumDecl),
    Action(ActionDecl),
}

impl Declaration {
    #[must_use]
    pub const fn kind(&self) -> DeclKind {
        match self {
            Self::CommonType(_) => DeclKind::CommonType,
            Self::Entity(_) => DeclKind::Entity,
            Self::Enum(_) => DeclKind::Enum,
            Self::Action(_) => DeclKind::Action,
        }
    }

    #[must_use]
    pub const fn annotations(&self) -> &Annotations {
        match self {
            Self::CommonType(decl) => &decl.annotations,
            Self::Entity(decl) => &decl.annotations,
            Self::Enum(decl) => &decl.annotations,
            Self::Action(decl) => &decl.annotations,
        }
    }

    /// Declared name as written (unqualified).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::CommonType(decl) => decl.name.as_str(),
            Self::Entity(decl) => decl.name.as_str(),
            Self::Enum(decl) => decl.name.as_str(),
            Self::Action(decl) => &decl.name,
        }
    }
}

impl From<CommonTypeDecl> for Declaration {
    fn from(decl: CommonTypeDecl) -> Self {
        Self::CommonType(decl)
    }
}

impl From<EntityDecl> for Declaration {
    fn from(decl: EntityDecl) -> Self {
        Self::Entity(decl)
    }
}

impl From<EnumDecl> for Declaration {
    fn from(decl: EnumDecl) -> Self {
        Self::Enum(decl)
    }
}

impl From<ActionDecl> for Declaration {
    fn from(decl: ActionDecl) -> Self {
        Self::Action(decl)
    }
}

///
/// CommonTypeDecl
/// `type Name = <type>;`
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CommonTypeDecl {
    pub name: Identifier,
    pub ty: Type,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl CommonTypeDecl {
    #[must_use]
    pub const fn new(name: Identifier, ty: Type) -> Self {
        Self {
            name,
            ty,
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn annotation(mut self, key: Identifier, value: impl Into<String>) -> Self {
        self.annotations.push(Annotation::new(key, value));
        self
    }
}

///
/// EntityDecl
/// `entity Name in [..] = { .. } tags T;`
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityDecl {
    pub name: Identifier,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<EntityType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<RecordType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Type>,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl EntityDecl {
    #[must_use]
    pub const fn new(name: Identifier) -> Self {
        Self {
            name,
            parents: Vec::new(),
            shape: None,
            tags: None,
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn parent(mut self, parent: EntityType) -> Self {
        self.parents.push(parent);
        self
    }

    #[must_use]
    pub fn parents(mut self, parents: impl IntoIterator<Item = EntityType>) -> Self {
        self.parents.extend(parents);
        self
    }

    #[must_use]
    pub fn shape(mut self, shape: RecordType) -> Self {
        self.shape = Some(shape);
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Type) -> Self {
        self.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn annotation(mut self, key: Identifier, value: impl Into<String>) -> Self {
        self.annotations.push(Annotation::new(key, value));
        self
    }
}

///
/// EnumDecl
/// `entity Name enum ["a", "b"];`
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EnumDecl {
    pub name: Identifier,
    pub values: Vec<String>,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl EnumDecl {
    #[must_use]
    pub fn new<I, S>(name: Identifier, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name,
            values: values.into_iter().map(Into::into).collect(),
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn annotation(mut self, key: Identifier, value: impl Into<String>) -> Self {
        self.annotations.push(Annotation::new(key, value));
        self
    }
}

///
/// ActionDecl
/// `action "name" in [..] appliesTo { .. };`
///
/// The name is an arbitrary string; an empty name is permitted.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionDecl {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<ActionParent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<AppliesTo>,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl ActionDecl {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            applies_to: None,
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn parent(mut self, parent: ActionParent) -> Self {
        self.parents.push(parent);
        self
    }

    #[must_use]
    pub fn applies_to(mut self, applies_to: AppliesTo) -> Self {
        self.applies_to = Some(applies_to);
        self
    }

    #[must_use]
    pub fn annotation(mut self, key: Identifier, value: impl Into<String>) -> Self {
        self.annotations.push(Annotation::new(key, value));
        self
    }
}

///
/// ActionParent
///
/// `in [view]` leaves `ty` unset (the enclosing namespace's `Action`);
/// `in [Other::Action::"view"]` names it explicitly.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ActionParent {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<EntityType>,
    pub id: String,
}

impl ActionParent {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            ty: None,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn typed(ty: EntityType, id: impl Into<String>) -> Self {
        Self {
            ty: Some(ty),
            id: id.into(),
        }
    }
}

///
/// AppliesTo
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AppliesTo {
    #[serde(default)]
    pub principals: Vec<EntityType>,

    #[serde(default)]
    pub resources: Vec<EntityType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Type>,
}

impl AppliesTo {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            principals: Vec::new(),
            resources: Vec::new(),
            context: None,
        }
    }

    #[must_use]
    pub fn principal(mut self, ty: EntityType) -> Self {
        self.principals.push(ty);
        self
    }

    #[must_use]
    pub fn resource(mut self, ty: EntityType) -> Self {
        self.resources.push(ty);
        self
    }

    #[must_use]
    pub fn context(mut self, context: Type) -> Self {
        self.context = Some(context);
        self
    }
}

///
/// TESTS
///
