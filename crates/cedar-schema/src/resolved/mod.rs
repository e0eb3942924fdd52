//! Module: resolved
//! Responsibility: the fully-qualified, indexed schema produced by `resolve`,
//! its lookups and canonical iterators, and projection back to an AST.
//! Boundary: everything stored here is qualified; no alias references remain.

mod project;
mod types;

pub use types::*;

use crate::{
    ast::DeclKind,
    name::{ActionUid, EntityType, Path},
    resolve::ResolveError,
    types::Annotations,
};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

///
/// ResolvedSchema
///
/// Ordered maps keyed by fully-qualified name. Iteration order is the
/// canonical order: by name within each kind.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "RawResolvedSchema")]
pub struct ResolvedSchema {
    pub(crate) entities: BTreeMap<EntityType, ResolvedEntity>,
    pub(crate) enums: BTreeMap<EntityType, ResolvedEnum>,

    #[serde(serialize_with = "serialize_actions")]
    pub(crate) actions: BTreeMap<ActionUid, ResolvedAction>,

    pub(crate) namespaces: BTreeMap<Path, ResolvedNamespace>,
}

impl ResolvedSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    //
    // lookups
    //

    #[must_use]
    pub fn entity(&self, name: &EntityType) -> Option<&ResolvedEntity> {
        self.entities.get(name)
    }

    #[must_use]
    pub fn enum_entity(&self, name: &EntityType) -> Option<&ResolvedEnum> {
        self.enums.get(name)
    }

    #[must_use]
    pub fn action(&self, uid: &ActionUid) -> Option<&ResolvedAction> {
        self.actions.get(uid)
    }

    #[must_use]
    pub fn namespace(&self, path: &Path) -> Option<&ResolvedNamespace> {
        self.namespaces.get(path)
    }

    /// True when `name` is a declared entity or enum entity type.
    #[must_use]
    pub fn contains_entity_type(&self, name: &EntityType) -> bool {
        self.entities.contains_key(name) || self.enums.contains_key(name)
    }

    //
    // iterators
    //

    pub fn entities(&self) -> impl Iterator<Item = &ResolvedEntity> + '_ {
        self.entities.values()
    }

    pub fn enums(&self) -> impl Iterator<Item = &ResolvedEnum> + '_ {
        self.enums.values()
    }

    pub fn actions(&self) -> impl Iterator<Item = &ResolvedAction> + '_ {
        self.actions.values()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &ResolvedNamespace> + '_ {
        self.namespaces.values()
    }

    /// Every declared entity and enum type name, entities first.
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityType> + '_ {
        self.entities.keys().chain(self.enums.keys())
    }

    /// Actions declared directly in `namespace`.
    pub fn actions_in_namespace<'a>(
        &'a self,
        namespace: &'a Path,
    ) -> impl Iterator<Item = &'a ResolvedAction> + 'a {
        self.actions
            .values()
            .filter(move |action| action.uid.ty.is_direct_child_of(namespace))
    }

    /// Entities, then enums, then actions, each in name order.
    pub fn declarations(&self) -> impl Iterator<Item = DeclarationRef<'_>> + '_ {
        self.entities
            .values()
            .map(DeclarationRef::Entity)
            .chain(self.enums.values().map(DeclarationRef::Enum))
            .chain(self.actions.values().map(DeclarationRef::Action))
    }

    /// Number of stored declarations across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len() + self.enums.len() + self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

///
/// DeclarationRef
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeclarationRef<'a> {
    Entity(&'a ResolvedEntity),
    Enum(&'a ResolvedEnum),
    Action(&'a ResolvedAction),
}

impl DeclarationRef<'_> {
    #[must_use]
    pub const fn kind(&self) -> DeclKind {
        match self {
            Self::Entity(_) => DeclKind::Entity,
            Self::Enum(_) => DeclKind::Enum,
            Self::Action(_) => DeclKind::Action,
        }
    }

    /// Namespace the declaration lives in.
    #[must_use]
    pub fn namespace(&self) -> Path {
        match self {
            Self::Entity(entity) => entity.name.namespace(),
            Self::Enum(enumeration) => enumeration.name.namespace(),
            Self::Action(action) => action.uid.namespace(),
        }
    }
}

///
/// ResolvedEntity
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResolvedEntity {
    pub name: EntityType,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<EntityType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ResolvedRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<ResolvedType>,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl ResolvedEntity {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&ResolvedAttr> {
        self.shape.as_ref().and_then(|shape| shape.get(name))
    }

    /// Call `f` on every entity type this declaration mentions.
    pub fn for_each_entity_ref<'a>(&'a self, f: &mut impl FnMut(&'a EntityType)) {
        for parent in &self.parents {
            f(parent);
        }
        if let Some(shape) = &self.shape {
            for attr in &shape.attrs {
                attr.ty.for_each_entity_ref(f);
            }
        }
        if let Some(tags) = &self.tags {
            tags.for_each_entity_ref(f);
        }
    }
}

///
/// ResolvedEnum
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResolvedEnum {
    pub name: EntityType,
    pub values: Vec<String>,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl ResolvedEnum {
    /// True when `id` is one of the declared values.
    #[must_use]
    pub fn admits(&self, id: &str) -> bool {
        self.values.iter().any(|value| value == id)
    }
}

///
/// ResolvedAction
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResolvedAction {
    pub uid: ActionUid,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<ActionUid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<ResolvedAppliesTo>,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl ResolvedAction {
    /// Call `f` on every entity type this declaration mentions.
    pub fn for_each_entity_ref<'a>(&'a self, f: &mut impl FnMut(&'a EntityType)) {
        let Some(applies_to) = &self.applies_to else {
            return;
        };
        for ty in applies_to.principals.iter().chain(&applies_to.resources) {
            f(ty);
        }
        if let Some(context) = &applies_to.context {
            for attr in &context.attrs {
                attr.ty.for_each_entity_ref(f);
            }
        }
    }
}

///
/// ResolvedAppliesTo
///
/// The context, when declared, is always a record.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResolvedAppliesTo {
    pub principals: Vec<EntityType>,
    pub resources: Vec<EntityType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ResolvedRecord>,
}

///
/// ResolvedNamespace
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResolvedNamespace {
    pub path: Path,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

// Action UIDs are structs, so the action map travels as a list.
fn serialize_actions<S: Serializer>(
    actions: &BTreeMap<ActionUid, ResolvedAction>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(actions.values())
}

///
/// RawResolvedSchema
///
/// Wire form of a `ResolvedSchema`. Nothing in it is trusted until
/// `TryFrom` has re-checked the keys against the stored names.
///

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawResolvedSchema {
    #[serde(default)]
    entities: BTreeMap<EntityType, ResolvedEntity>,

    #[serde(default)]
    enums: BTreeMap<EntityType, ResolvedEnum>,

    #[serde(default)]
    actions: Vec<ResolvedAction>,

    #[serde(default)]
    namespaces: BTreeMap<Path, ResolvedNamespace>,
}

impl TryFrom<RawResolvedSchema> for ResolvedSchema {
    type Error = ResolveError;

    fn try_from(raw: RawResolvedSchema) -> Result<Self, Self::Error> {
        for (key, entity) in &raw.entities {
            check_key(key, &entity.name)?;
            check_unrooted(key)?;

            let mut refs = Vec::new();
            entity.for_each_entity_ref(&mut |name| refs.push(name));
            refs.into_iter().try_for_each(check_unrooted)?;
        }

        for (key, enumeration) in &raw.enums {
            check_key(key, &enumeration.name)?;
            check_unrooted(key)?;

            if raw.entities.contains_key(key) {
                return Err(ResolveError::EntityEnumClash { name: key.clone() });
            }
        }

        let mut actions = BTreeMap::new();
        for action in raw.actions {
            check_unrooted(&action.uid.ty)?;
            for parent in &action.parents {
                check_unrooted(&parent.ty)?;
            }

            let mut refs = Vec::new();
            action.for_each_entity_ref(&mut |name| refs.push(name));
            refs.into_iter().try_for_each(check_unrooted)?;

            if actions.contains_key(&action.uid) {
                return Err(ResolveError::ActionDuplicate { uid: action.uid });
            }
            actions.insert(action.uid.clone(), action);
        }

        for (key, namespace) in &raw.namespaces {
            if key != &namespace.path {
                return Err(ResolveError::SnapshotKeyMismatch {
                    key: key.to_string(),
                    name: namespace.path.to_string(),
                });
            }
            if key.is_rooted() {
                return Err(ResolveError::SnapshotRootedName {
                    name: key.to_string(),
                });
            }
        }

        Ok(Self {
            entities: raw.entities,
            enums: raw.enums,
            actions,
            namespaces: raw.namespaces,
        })
    }
}

fn check_key(key: &EntityType, name: &EntityType) -> Result<(), ResolveError> {
    if key == name {
        Ok(())
    } else {
        Err(ResolveError::SnapshotKeyMismatch {
            key: key.to_string(),
            name: name.to_string(),
        })
    }
}

fn check_unrooted(name: &EntityType) -> Result<(), ResolveError> {
    if name.is_rooted() {
        Err(ResolveError::SnapshotRootedName {
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{ActionDecl, EntityDecl, EnumDecl, Namespace, Schema},
        name::Identifier,
    };

    fn ident(s: &str) -> Identifier {
        Identifier::new(s).unwrap()
    }

    fn ety(s: &str) -> EntityType {
        EntityType::parse(s).unwrap()
    }

    fn sample() -> ResolvedSchema {
        Schema::new()
            .declare(EntityDecl::new(ident("Zeta")))
            .declare(EntityDecl::new(ident("Alpha")))
            .declare(ActionDecl::new("view"))
            .namespace(
                Namespace::new(Path::parse("App").unwrap())
                    .declare(EnumDecl::new(ident("Color"), ["red", "blue"]))
                    .declare(ActionDecl::new("edit")),
            )
            .resolve()
            .unwrap()
    }

    #[test]
    fn declarations_iterate_in_canonical_order() {
        let schema = sample();

        let order: Vec<_> = schema
            .declarations()
            .map(|decl| match decl {
                DeclarationRef::Entity(e) => e.name.to_string(),
                DeclarationRef::Enum(e) => e.name.to_string(),
                DeclarationRef::Action(a) => a.uid.to_string(),
            })
            .collect();

        assert_eq!(
            order,
            [
                "Alpha",
                "Zeta",
                "App::Color",
                "Action::\"view\"",
                "App::Action::\"edit\""
            ]
        );
        assert_eq!(schema.len(), 5);
    }

    #[test]
    fn iteration_stops_early_without_visiting_rest() {
        let schema = sample();
        let mut visited = 0;

        let first_enum = schema
            .declarations()
            .inspect(|_| visited += 1)
            .find(|decl| decl.kind() == DeclKind::Enum);

        assert!(first_enum.is_some());
        assert_eq!(visited, 3);
    }

    #[test]
    fn lookups_and_enum_admission() {
        let schema = sample();
        let color = schema.enum_entity(&ety("App::Color")).unwrap();

        assert!(color.admits("red"));
        assert!(!color.admits("green"));
        assert!(schema.contains_entity_type(&ety("Alpha")));
        assert!(schema.contains_entity_type(&ety("App::Color")));
        assert!(!schema.contains_entity_type(&ety("Color")));
    }

    #[test]
    fn actions_filter_by_namespace() {
        let schema = sample();
        let app = Path::parse("App").unwrap();
        let global = Path::global();

        let app_actions: Vec<_> = schema
            .actions_in_namespace(&app)
            .map(|a| a.uid.id.as_str())
            .collect();
        let global_actions: Vec<_> = schema
            .actions_in_namespace(&global)
            .map(|a| a.uid.id.as_str())
            .collect();

        assert_eq!(app_actions, ["edit"]);
        assert_eq!(global_actions, ["view"]);
    }

    #[test]
    fn serde_snapshot_round_trips() {
        let schema = sample();

        let json = serde_json::to_value(&schema).unwrap();
        assert!(json["actions"].is_array());
        assert!(json["entities"]["Alpha"].is_object());

        let back: ResolvedSchema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }

    fn snapshot_error(json: &str) -> String {
        serde_json::from_str::<ResolvedSchema>(json)
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn snapshot_rejects_key_that_differs_from_name() {
        let err = snapshot_error(
            r#"{
                "entities": { "X": { "name": "Y" } },
                "enums": { "X": { "name": "X", "values": [] } }
            }"#,
        );

        assert!(err.contains("snapshot key 'X' does not match stored name 'Y'"));
    }

    #[test]
    fn snapshot_rejects_entity_enum_clash() {
        let err = snapshot_error(
            r#"{
                "entities": { "X": { "name": "X" } },
                "enums": { "X": { "name": "X", "values": [] } }
            }"#,
        );

        assert!(err.contains("'X' is declared as both an entity type and an enum entity type"));
    }

    #[test]
    fn snapshot_rejects_rooted_names() {
        let key = snapshot_error(r#"{ "entities": { "::X": { "name": "::X" } } }"#);
        assert!(key.contains("snapshot stores rooted name '::X'"));

        let parent = snapshot_error(
            r#"{ "entities": { "X": { "name": "X", "parents": ["::G"] } } }"#,
        );
        assert!(parent.contains("snapshot stores rooted name '::G'"));

        let principal = snapshot_error(
            r#"{ "actions": [{
                "uid": { "type": "Action", "id": "view" },
                "applies_to": { "principals": ["::User"], "resources": [] }
            }] }"#,
        );
        assert!(principal.contains("snapshot stores rooted name '::User'"));
    }

    #[test]
    fn snapshot_rejects_repeated_action() {
        let err = snapshot_error(
            r#"{ "actions": [
                { "uid": { "type": "Action", "id": "view" } },
                { "uid": { "type": "Action", "id": "view" } }
            ] }"#,
        );

        assert!(err.contains("action Action::\"view\" is declared more than once"));
    }

    #[test]
    fn snapshot_rejects_unknown_fields() {
        let err = snapshot_error(r#"{ "entities": {}, "aliases": {} }"#);

        assert!(err.contains("unknown field `aliases`"));
    }
}
