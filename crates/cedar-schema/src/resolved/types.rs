use crate::{
    name::EntityType,
    types::{Annotations, CEDAR_NAMESPACE, Extension, fmt_record},
};
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// ResolvedType
///
/// Type expression after resolution. There is no alias variant: every
/// common-type reference has been inlined, and extension names are drawn
/// from the closed `Extension` set.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ResolvedType {
    String,
    Long,
    Bool,
    Extension(Extension),
    Set(Box<ResolvedType>),
    Record(ResolvedRecord),
    Entity(EntityType),
}

impl ResolvedType {
    #[must_use]
    pub fn set(element: Self) -> Self {
        Self::Set(Box::new(element))
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&ResolvedRecord> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Short label used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Long => "Long",
            Self::Bool => "Bool",
            Self::Extension(_) => "extension",
            Self::Set(_) => "set",
            Self::Record(_) => "record",
            Self::Entity(_) => "entity reference",
        }
    }

    /// Call `f` on every entity reference reachable from this type.
    pub fn for_each_entity_ref<'a>(&'a self, f: &mut impl FnMut(&'a EntityType)) {
        match self {
            Self::String | Self::Long | Self::Bool | Self::Extension(_) => {}
            Self::Set(element) => element.for_each_entity_ref(f),
            Self::Record(record) => {
                for attr in &record.attrs {
                    attr.ty.for_each_entity_ref(f);
                }
            }
            Self::Entity(ty) => f(ty),
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Long => f.write_str("Long"),
            Self::Bool => f.write_str("Bool"),
            Self::Extension(ext) => write!(f, "{CEDAR_NAMESPACE}::{ext}"),
            Self::Set(element) => write!(f, "Set<{element}>"),
            Self::Record(record) => write!(f, "{record}"),
            Self::Entity(ty) => write!(f, "{ty}"),
        }
    }
}

///
/// ResolvedRecord
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResolvedRecord {
    pub attrs: Vec<ResolvedAttr>,
}

impl ResolvedRecord {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedAttr> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// `(name, type)` pairs in declaration order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &ResolvedType)> + '_ {
        self.attrs.iter().map(|a| (a.name.as_str(), &a.ty))
    }
}

impl fmt::Display for ResolvedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_record(f, self.attrs.iter().map(|a| (&a.name, a.required, &a.ty)))
    }
}

///
/// ResolvedAttr
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResolvedAttr {
    pub name: String,
    pub ty: ResolvedType,
    pub required: bool,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_refs_are_found_through_sets_and_records() {
        let user = EntityType::parse("App::User").unwrap();
        let group = EntityType::parse("Group").unwrap();

        let ty = ResolvedType::Record(ResolvedRecord {
            attrs: vec![
                ResolvedAttr {
                    name: "owner".into(),
                    ty: ResolvedType::Entity(user.clone()),
                    required: true,
                    annotations: Annotations::new(),
                },
                ResolvedAttr {
                    name: "groups".into(),
                    ty: ResolvedType::set(ResolvedType::Entity(group.clone())),
                    required: false,
                    annotations: Annotations::new(),
                },
            ],
        });

        let mut seen = Vec::new();
        ty.for_each_entity_ref(&mut |name| seen.push(name.clone()));

        assert_eq!(seen, [user, group]);
        assert_eq!(
            ty.to_string(),
            r#"{ "owner": App::User, "groups"?: Set<Group> }"#
        );
    }
}
