//! Module: resolve
//! Responsibility: turn a written `Schema` into a `ResolvedSchema` with every
//! name fully qualified and every common type inlined.
//! Does not own: the resolved data model or its projection (see `resolved`).
//!
//! Resolution runs in two stages:
//! 1. a pre-pass indexes every common type and declared entity/enum name,
//! 2. the main walk visits nodes in source order and fills the output maps,
//!    expanding aliases lazily against the pre-pass tables.
//!
//! The first fatal error aborts the walk; no partial schema escapes.

mod error;
mod options;
mod scope;
mod types;

#[cfg(test)]
mod tests;

pub use error::ResolveError;
pub use options::ResolveOptions;

use crate::{
    ast::{ActionDecl, DeclKind, Declaration, EntityDecl, EnumDecl, Namespace, Node, Schema},
    name::{ActionUid, EntityType, Path},
    obs::{NoopSink, ResolveEvent, ResolveSink},
    resolved::{
        ResolvedAction, ResolvedAppliesTo, ResolvedEntity, ResolvedEnum, ResolvedNamespace,
        ResolvedSchema, ResolvedType,
    },
};
use scope::{AliasId, ScopeTables};
use std::collections::btree_map::Entry;

/// Resolve with default options and no telemetry.
pub fn resolve(schema: &Schema) -> Result<ResolvedSchema, ResolveError> {
    resolve_with(schema, ResolveOptions::default(), &mut NoopSink)
}

/// Resolve with explicit options, reporting each step to `sink`.
pub fn resolve_with(
    schema: &Schema,
    options: ResolveOptions,
    sink: &mut dyn ResolveSink,
) -> Result<ResolvedSchema, ResolveError> {
    let scope = ScopeTables::build(schema)?;

    tracing::debug!(
        nodes = schema.nodes().len(),
        common_types = scope.alias_count(),
        strict_extensions = options.strict_extensions,
        "resolving schema"
    );

    let resolved = Resolver {
        options,
        sink,
        scope,
        stack: Vec::new(),
        output: ResolvedSchema::new(),
    }
    .run(schema)?;

    tracing::debug!(
        entities = resolved.entities.len(),
        enums = resolved.enums.len(),
        actions = resolved.actions.len(),
        namespaces = resolved.namespaces.len(),
        "schema resolved"
    );

    Ok(resolved)
}

///
/// Resolver
///
/// State for one resolution. Alias caches live in `scope` and are dropped
/// with the resolver.
///

struct Resolver<'a, 's> {
    options: ResolveOptions,
    sink: &'s mut dyn ResolveSink,
    scope: ScopeTables<'a>,

    // aliases currently being expanded, outermost first
    stack: Vec<AliasId>,
    output: ResolvedSchema,
}

impl<'a> Resolver<'a, '_> {
    fn run(mut self, schema: &'a Schema) -> Result<ResolvedSchema, ResolveError> {
        for node in schema.nodes() {
            match node {
                Node::Namespace(ns) => self.namespace(ns)?,
                Node::Declaration(decl) => self.declaration(&Path::global(), decl)?,
            }
        }

        Ok(self.output)
    }

    fn namespace(&mut self, ns: &Namespace) -> Result<(), ResolveError> {
        let path = ns.path.unrooted();

        let merged = match self.output.namespaces.entry(path.clone()) {
            Entry::Occupied(mut existing) => {
                existing.get_mut().annotations.extend(&ns.annotations);
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(ResolvedNamespace {
                    path: path.clone(),
                    annotations: ns.annotations.clone(),
                });
                false
            }
        };
        if merged {
            tracing::debug!(namespace = %path, "namespace block merged");
            self.sink.record(ResolveEvent::NamespaceMerged { path: &path });
        }

        for kind in DeclKind::PRIORITY {
            for decl in ns.declarations.iter().filter(|decl| decl.kind() == kind) {
                self.declaration(&path, decl)?;
            }
        }

        Ok(())
    }

    fn declaration(&mut self, ns: &Path, decl: &Declaration) -> Result<(), ResolveError> {
        match decl {
            Declaration::CommonType(decl) => {
                if let Some(id) = self.scope.alias_in(ns, &decl.name) {
                    self.expand_alias(id)?;
                }
            }
            Declaration::Entity(decl) => self.entity(ns, decl)?,
            Declaration::Enum(decl) => self.enumeration(ns, decl)?,
            Declaration::Action(decl) => self.action(ns, decl)?,
        }
        self.sink
            .record(ResolveEvent::DeclarationResolved { kind: decl.kind() });

        Ok(())
    }

    fn entity(&mut self, ns: &Path, decl: &EntityDecl) -> Result<(), ResolveError> {
        let name = EntityType::in_namespace(ns, decl.name.clone());

        let parents = decl
            .parents
            .iter()
            .map(|parent| self.qualify_entity_ref(ns, parent))
            .collect();
        let shape = decl
            .shape
            .as_ref()
            .map(|shape| self.resolve_record(ns, shape))
            .transpose()?;
        let tags = decl
            .tags
            .as_ref()
            .map(|tags| self.resolve_type(ns, tags))
            .transpose()?;

        if self.output.entities.contains_key(&name) {
            return Err(ResolveError::EntityDuplicate { name });
        }
        if self.output.enums.contains_key(&name) {
            return Err(ResolveError::EntityEnumClash { name });
        }

        tracing::trace!(entity = %name, "entity resolved");
        self.output.entities.insert(
            name.clone(),
            ResolvedEntity {
                name,
                parents,
                shape,
                tags,
                annotations: decl.annotations.clone(),
            },
        );

        Ok(())
    }

    fn enumeration(&mut self, ns: &Path, decl: &EnumDecl) -> Result<(), ResolveError> {
        let name = EntityType::in_namespace(ns, decl.name.clone());

        if self.output.enums.contains_key(&name) {
            return Err(ResolveError::EnumDuplicate { name });
        }
        if self.output.entities.contains_key(&name) {
            return Err(ResolveError::EntityEnumClash { name });
        }

        tracing::trace!(enum_entity = %name, values = decl.values.len(), "enum resolved");
        self.output.enums.insert(
            name.clone(),
            ResolvedEnum {
                name,
                values: decl.values.clone(),
                annotations: decl.annotations.clone(),
            },
        );

        Ok(())
    }

    fn action(&mut self, ns: &Path, decl: &ActionDecl) -> Result<(), ResolveError> {
        let uid = ActionUid::in_namespace(ns, decl.name.clone());

        let parents = decl
            .parents
            .iter()
            .map(|parent| {
                let ty = match &parent.ty {
                    Some(ty) => self.qualify_entity_ref(ns, ty),
                    None => EntityType::action_in(ns),
                };

                ActionUid::new(ty, parent.id.clone())
            })
            .collect();

        let applies_to = match &decl.applies_to {
            Some(applies_to) => {
                let context = match &applies_to.context {
                    Some(context) => match self.resolve_type(ns, context)? {
                        ResolvedType::Record(record) => Some(record),
                        other => {
                            return Err(ResolveError::ContextNotRecord {
                                action: uid,
                                found: other.to_string(),
                            });
                        }
                    },
                    None => None,
                };

                Some(ResolvedAppliesTo {
                    principals: self.qualify_all(ns, &applies_to.principals),
                    resources: self.qualify_all(ns, &applies_to.resources),
                    context,
                })
            }
            None => None,
        };

        if self.output.actions.contains_key(&uid) {
            return Err(ResolveError::ActionDuplicate { uid });
        }

        tracing::trace!(action = %uid, "action resolved");
        self.output.actions.insert(
            uid.clone(),
            ResolvedAction {
                uid,
                parents,
                applies_to,
                annotations: decl.annotations.clone(),
            },
        );

        Ok(())
    }

    fn qualify_all(&self, ns: &Path, names: &[EntityType]) -> Vec<EntityType> {
        names
            .iter()
            .map(|name| self.qualify_entity_ref(ns, name))
            .collect()
    }
}
