use crate::name::{EntityType, Identifier, Path};
use derive_more::{Deref, Display, IntoIterator};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace under which built-in types may be spelled explicitly
/// (`__cedar::String`, `__cedar::ipaddr`).
pub const CEDAR_NAMESPACE: &str = "__cedar";

///
/// Extension
///
/// The closed set of extension types a schema can mention.
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[remain::sorted]
pub enum Extension {
    #[display("datetime")]
    Datetime,
    #[display("decimal")]
    Decimal,
    #[display("duration")]
    Duration,
    #[display("ipaddr")]
    Ipaddr,
}

impl Extension {
    pub const ALL: [Self; 4] = [Self::Datetime, Self::Decimal, Self::Duration, Self::Ipaddr];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Datetime => "datetime",
            Self::Decimal => "decimal",
            Self::Duration => "duration",
            Self::Ipaddr => "ipaddr",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ext| ext.name() == name)
    }

    #[must_use]
    pub fn ident(self) -> Identifier {
        Identifier::from_static(self.name())
    }
}

///
/// Annotation
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Annotation {
    pub key: Identifier,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Annotation {
    #[must_use]
    pub fn new(key: Identifier, value: impl Into<String>) -> Self {
        Self {
            key,
            value: Some(value.into()),
        }
    }

    #[must_use]
    pub const fn flag(key: Identifier) -> Self {
        Self { key, value: None }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "@{}(\"{}\")", self.key, value.escape_debug()),
            None => write!(f, "@{}", self.key),
        }
    }
}

///
/// Annotations
///
/// Ordered annotation list. Order is source order; repeated namespace blocks
/// concatenate their lists.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, IntoIterator, PartialEq, Serialize)]
#[serde(transparent)]
#[into_iterator(owned, ref)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.0.push(annotation);
    }

    /// Append every annotation from `other`, keeping both orders.
    pub fn extend(&mut self, other: &Self) {
        self.0.extend(other.0.iter().cloned());
    }

    /// First annotation with the given key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Annotation> {
        self.0.iter().find(|a| a.key.as_str() == key)
    }
}

impl FromIterator<Annotation> for Annotations {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// Type
///
/// Schema type expression as written. `TypeRef` names a common-type alias
/// and only exists before resolution.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Type {
    String,
    Long,
    Bool,
    Extension(Identifier),
    Set(Box<Type>),
    Record(RecordType),
    Entity(EntityType),
    TypeRef(Path),
}

impl Type {
    #[must_use]
    pub fn set(element: Self) -> Self {
        Self::Set(Box::new(element))
    }

    #[must_use]
    pub fn extension(ext: Extension) -> Self {
        Self::Extension(ext.ident())
    }

    #[must_use]
    pub const fn entity(ty: EntityType) -> Self {
        Self::Entity(ty)
    }

    #[must_use]
    pub const fn type_ref(path: Path) -> Self {
        Self::TypeRef(path)
    }

    #[must_use]
    pub const fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }
}

impl From<RecordType> for Type {
    fn from(record: RecordType) -> Self {
        Self::Record(record)
    }
}

impl From<EntityType> for Type {
    fn from(ty: EntityType) -> Self {
        Self::Entity(ty)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("String"),
            Self::Long => f.write_str("Long"),
            Self::Bool => f.write_str("Bool"),
            Self::Extension(name) => write!(f, "{CEDAR_NAMESPACE}::{name}"),
            Self::Set(element) => write!(f, "Set<{element}>"),
            Self::Record(record) => write!(f, "{record}"),
            Self::Entity(ty) => write!(f, "{ty}"),
            Self::TypeRef(path) => write!(f, "{path}"),
        }
    }
}

///
/// RecordType
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RecordType {
    pub attrs: Vec<RecordAttr>,
}

impl RecordType {
    #[must_use]
    pub const fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    /// Append a required attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.attrs.push(RecordAttr::required(name, ty));
        self
    }

    /// Append an optional attribute.
    #[must_use]
    pub fn optional_attr(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.attrs.push(RecordAttr::optional(name, ty));
        self
    }

    /// Append a fully built attribute.
    #[must_use]
    pub fn with_attr(mut self, attr: RecordAttr) -> Self {
        self.attrs.push(attr);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RecordAttr> {
        self.attrs.iter().find(|a| a.name == name)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_record(f, self.attrs.iter().map(|a| (&a.name, a.required, &a.ty)))
    }
}

///
/// RecordAttr
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RecordAttr {
    pub name: String,
    pub ty: Type,
    pub required: bool,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl RecordAttr {
    #[must_use]
    pub fn required(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn optional(name: impl Into<String>, ty: Type) -> Self {
        Self {
            required: false,
            ..Self::required(name, ty)
        }
    }

    #[must_use]
    pub fn annotation(mut self, key: Identifier, value: impl Into<String>) -> Self {
        self.annotations.push(Annotation::new(key, value));
        self
    }
}

// Shared by the unresolved and resolved record renderings.
pub(crate) fn fmt_record<'a, T: fmt::Display + 'a>(
    f: &mut fmt::Formatter<'_>,
    attrs: impl ExactSizeIterator<Item = (&'a String, bool, &'a T)>,
) -> fmt::Result {
    if attrs.len() == 0 {
        return f.write_str("{}");
    }

    f.write_str("{ ")?;
    for (i, (name, required, ty)) in attrs.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        let marker = if required { "" } else { "?" };
        write!(f, "\"{}\"{marker}: {ty}", name.escape_debug())?;
    }
    f.write_str(" }")
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Identifier {
        Identifier::new(s).unwrap()
    }

    #[test]
    fn extension_names_are_closed() {
        for ext in Extension::ALL {
            assert_eq!(Extension::from_name(ext.name()), Some(ext));
            assert_eq!(ext.to_string(), ext.name());
        }
        assert_eq!(Extension::from_name("Ipaddr"), None);
        assert_eq!(Extension::from_name("uuid"), None);
    }

    #[test]
    fn structural_equality_is_deep() {
        let a = Type::set(Type::Record(RecordType::new().attr("x", Type::Long)));
        let b = Type::set(Type::Record(RecordType::new().attr("x", Type::Long)));
        let c = Type::set(Type::Record(RecordType::new().optional_attr("x", Type::Long)));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn display_uses_cedar_spellings() {
        let ty = Type::Record(
            RecordType::new()
                .attr("name", Type::String)
                .optional_attr("tags", Type::set(Type::extension(Extension::Ipaddr)))
                .attr("owner", Type::Entity(EntityType::parse("App::User").unwrap())),
        );

        assert_eq!(
            ty.to_string(),
            r#"{ "name": String, "tags"?: Set<__cedar::ipaddr>, "owner": App::User }"#
        );
        assert_eq!(Type::Record(RecordType::new()).to_string(), "{}");
    }

    #[test]
    fn annotations_keep_order_and_concatenate() {
        let mut first: Annotations = [Annotation::new(ident("doc"), "one")].into_iter().collect();
        let second: Annotations = [Annotation::flag(ident("internal"))].into_iter().collect();

        first.extend(&second);

        let keys: Vec<_> = first.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, ["doc", "internal"]);
        assert_eq!(first.get("doc").unwrap().to_string(), "@doc(\"one\")");
        assert_eq!(first.get("internal").unwrap().to_string(), "@internal");
    }

    #[test]
    fn builder_input_is_copied_by_value() {
        let mut name = String::from("first");
        let record = RecordType::new().attr(name.clone(), Type::Bool);
        name.push_str("_changed");

        assert!(record.get("first").is_some());
        assert!(record.get("first_changed").is_none());
    }
}
