//! Reverse projection: `ResolvedSchema` back to a canonical `Schema`.
//!
//! Output order is global declarations first, then namespaces by path; inside
//! each, entities, enums and actions sorted by name. References are written in
//! the shortest form that resolves back to the same fully-qualified name.

use super::{
    ResolvedAction, ResolvedEntity, ResolvedEnum, ResolvedRecord, ResolvedSchema, ResolvedType,
};
use crate::{
    ast::{
        ActionDecl, ActionParent, AppliesTo, Declaration, EntityDecl, EnumDecl, Namespace, Schema,
    },
    name::{ActionUid, EntityType, Identifier, Path},
    types::{Annotations, RecordAttr, RecordType, Type},
};
use std::collections::{BTreeMap, BTreeSet};

impl ResolvedSchema {
    /// Project back to a canonical AST. Resolving the result yields a schema
    /// equal to `self`.
    #[must_use]
    pub fn to_schema(&self) -> Schema {
        Projector::new(self).project()
    }
}

impl From<&ResolvedSchema> for Schema {
    fn from(resolved: &ResolvedSchema) -> Self {
        resolved.to_schema()
    }
}

///
/// Group
///

#[derive(Default)]
struct Group<'a> {
    entities: Vec<&'a ResolvedEntity>,
    enums: Vec<&'a ResolvedEnum>,
    actions: Vec<&'a ResolvedAction>,
}

///
/// Projector
///

struct Projector<'a> {
    schema: &'a ResolvedSchema,
    // single-segment entity and enum names; these win over namespace-local
    // names when an unqualified reference is resolved
    global_names: BTreeSet<&'a Identifier>,
}

impl<'a> Projector<'a> {
    fn new(schema: &'a ResolvedSchema) -> Self {
        let global_names = schema
            .entity_types()
            .filter(|name| name.len() == 1)
            .filter_map(|name| name.basename())
            .collect();

        Self {
            schema,
            global_names,
        }
    }

    fn project(&self) -> Schema {
        let mut groups: BTreeMap<Path, Group<'a>> = self
            .schema
            .namespaces
            .keys()
            .map(|path| (path.clone(), Group::default()))
            .collect();

        for entity in self.schema.entities.values() {
            groups
                .entry(entity.name.namespace())
                .or_default()
                .entities
                .push(entity);
        }
        for enumeration in self.schema.enums.values() {
            groups
                .entry(enumeration.name.namespace())
                .or_default()
                .enums
                .push(enumeration);
        }
        for action in self.schema.actions.values() {
            groups
                .entry(action.uid.namespace())
                .or_default()
                .actions
                .push(action);
        }

        let mut schema = Schema::new();
        for (path, group) in groups {
            let declarations = self.group_declarations(&path, &group);

            match self.schema.namespaces.get(&path) {
                Some(ns) => schema.push(Namespace {
                    path,
                    annotations: ns.annotations.clone(),
                    declarations,
                }),
                None if path.is_global() => {
                    for decl in declarations {
                        schema.push(decl);
                    }
                }
                None => schema.push(Namespace {
                    path,
                    annotations: Annotations::new(),
                    declarations,
                }),
            }
        }

        schema
    }

    fn group_declarations(&self, ns: &Path, group: &Group<'_>) -> Vec<Declaration> {
        let entities = group
            .entities
            .iter()
            .map(|e| Declaration::from(self.entity(ns, e)));
        let enums = group
            .enums
            .iter()
            .map(|e| Declaration::from(Self::enumeration(e)));
        let actions = group
            .actions
            .iter()
            .map(|a| Declaration::from(self.action(ns, a)));

        entities.chain(enums).chain(actions).collect()
    }

    fn entity(&self, ns: &Path, entity: &ResolvedEntity) -> EntityDecl {
        EntityDecl {
            name: local_name(&entity.name),
            parents: entity
                .parents
                .iter()
                .map(|parent| self.localize(parent, ns))
                .collect(),
            shape: entity.shape.as_ref().map(|shape| self.record(shape, ns)),
            tags: entity.tags.as_ref().map(|tags| self.ty(tags, ns)),
            annotations: entity.annotations.clone(),
        }
    }

    fn enumeration(enumeration: &ResolvedEnum) -> EnumDecl {
        EnumDecl {
            name: local_name(&enumeration.name),
            values: enumeration.values.clone(),
            annotations: enumeration.annotations.clone(),
        }
    }

    fn action(&self, ns: &Path, action: &ResolvedAction) -> ActionDecl {
        let applies_to = action.applies_to.as_ref().map(|applies_to| AppliesTo {
            principals: self.localize_all(&applies_to.principals, ns),
            resources: self.localize_all(&applies_to.resources, ns),
            context: applies_to
                .context
                .as_ref()
                .map(|context| Type::Record(self.record(context, ns))),
        });

        ActionDecl {
            name: action.uid.id.clone(),
            parents: action
                .parents
                .iter()
                .map(|parent| self.action_parent(parent, ns))
                .collect(),
            applies_to,
            annotations: action.annotations.clone(),
        }
    }

    fn action_parent(&self, parent: &ActionUid, ns: &Path) -> ActionParent {
        if parent.ty == EntityType::action_in(ns) {
            ActionParent::new(parent.id.clone())
        } else {
            ActionParent::typed(self.localize(&parent.ty, ns), parent.id.clone())
        }
    }

    fn record(&self, record: &ResolvedRecord, ns: &Path) -> RecordType {
        RecordType {
            attrs: record
                .attrs
                .iter()
                .map(|attr| RecordAttr {
                    name: attr.name.clone(),
                    ty: self.ty(&attr.ty, ns),
                    required: attr.required,
                    annotations: attr.annotations.clone(),
                })
                .collect(),
        }
    }

    fn ty(&self, ty: &ResolvedType, ns: &Path) -> Type {
        match ty {
            ResolvedType::String => Type::String,
            ResolvedType::Long => Type::Long,
            ResolvedType::Bool => Type::Bool,
            ResolvedType::Extension(ext) => Type::extension(*ext),
            ResolvedType::Set(element) => Type::set(self.ty(element, ns)),
            ResolvedType::Record(record) => Type::Record(self.record(record, ns)),
            ResolvedType::Entity(name) => Type::Entity(self.localize(name, ns)),
        }
    }

    fn localize_all(&self, names: &[EntityType], ns: &Path) -> Vec<EntityType> {
        names.iter().map(|name| self.localize(name, ns)).collect()
    }

    // Shortest spelling of `target` that resolves back to `target` when read
    // inside `ns`.
    fn localize(&self, target: &EntityType, ns: &Path) -> EntityType {
        if ns.is_global() {
            return target.clone();
        }
        let Some(base) = target.basename() else {
            return target.clone();
        };
        let shadowed = self.global_names.contains(base);

        if target.is_direct_child_of(ns) {
            // a global declaration of the same base name would capture `base`
            if shadowed {
                target.clone()
            } else {
                EntityType::from(base.clone())
            }
        } else if target.len() == 1 {
            // an undeclared bare name would be re-qualified into `ns`
            if shadowed {
                EntityType::from(base.clone())
            } else {
                EntityType::rooted(base.clone())
            }
        } else {
            target.clone()
        }
    }
}

fn local_name(name: &EntityType) -> Identifier {
    name.basename()
        .cloned()
        .unwrap_or_else(|| Identifier::from_static(crate::name::ACTION_ENTITY_TYPE))
}

///
/// TESTS
///
