//! Scope tables built once per resolution, before the main walk.
//!
//! Common types live in an arena addressed by `AliasId`; the global and
//! per-namespace tables map bare names to arena slots. Each slot carries its
//! own expansion state, so memoisation and cycle detection need no extra
//! bookkeeping outside the arena.

use crate::{
    ast::{CommonTypeDecl, Declaration, Schema},
    name::{EntityType, Identifier, Path},
    resolve::ResolveError,
    resolved::ResolvedType,
};
use std::collections::{HashMap, HashSet, hash_map::Entry};

///
/// AliasId
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(super) struct AliasId(usize);

///
/// AliasState
///

#[derive(Debug)]
pub(super) enum AliasState {
    Pending,
    Expanding,
    Resolved(ResolvedType),
}

///
/// AliasEntry
///

#[derive(Debug)]
pub(super) struct AliasEntry<'a> {
    /// Fully-qualified alias name, for diagnostics.
    pub name: Path,
    /// Namespace the alias target is resolved in.
    pub namespace: Path,
    pub decl: &'a CommonTypeDecl,
    pub state: AliasState,
}

///
/// ScopeTables
///

#[derive(Debug, Default)]
pub(super) struct ScopeTables<'a> {
    aliases: Vec<AliasEntry<'a>>,
    global: HashMap<Identifier, AliasId>,
    namespaced: HashMap<Path, HashMap<Identifier, AliasId>>,

    // fully-qualified entity and enum names
    declared: HashSet<EntityType>,
}

impl<'a> ScopeTables<'a> {
    pub(super) fn build(schema: &'a Schema) -> Result<Self, ResolveError> {
        let mut tables = Self::default();

        for (namespace, decl) in schema.declarations() {
            let namespace = namespace.unrooted();

            match decl {
                Declaration::CommonType(decl) => tables.insert_alias(namespace, decl)?,
                Declaration::Entity(decl) => {
                    tables
                        .declared
                        .insert(EntityType::in_namespace(&namespace, decl.name.clone()));
                }
                Declaration::Enum(decl) => {
                    tables
                        .declared
                        .insert(EntityType::in_namespace(&namespace, decl.name.clone()));
                }
                Declaration::Action(_) => {}
            }
        }

        Ok(tables)
    }

    fn insert_alias(
        &mut self,
        namespace: Path,
        decl: &'a CommonTypeDecl,
    ) -> Result<(), ResolveError> {
        let id = AliasId(self.aliases.len());
        let table = if namespace.is_global() {
            &mut self.global
        } else {
            self.namespaced.entry(namespace.clone()).or_default()
        };

        match table.entry(decl.name.clone()) {
            Entry::Occupied(_) => {
                return Err(ResolveError::CommonTypeDuplicate {
                    name: namespace.join(decl.name.clone()),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        self.aliases.push(AliasEntry {
            name: namespace.join(decl.name.clone()),
            namespace,
            decl,
            state: AliasState::Pending,
        });

        Ok(())
    }

    /// Alias `name` declared directly in `namespace` (global when empty).
    pub(super) fn alias_in(&self, namespace: &Path, name: &Identifier) -> Option<AliasId> {
        if namespace.is_global() {
            self.global.get(name).copied()
        } else {
            self.namespaced.get(namespace)?.get(name).copied()
        }
    }

    pub(super) fn global_alias(&self, name: &Identifier) -> Option<AliasId> {
        self.global.get(name).copied()
    }

    /// True for any entity or enum declared anywhere in the schema.
    pub(super) fn is_declared(&self, name: &EntityType) -> bool {
        self.declared.contains(name)
    }

    /// True when `name` is an entity or enum declared at top level.
    pub(super) fn is_global_declared(&self, name: &Identifier) -> bool {
        self.declared.contains(&EntityType::from(name.clone()))
    }

    pub(super) fn entry(&self, id: AliasId) -> &AliasEntry<'a> {
        &self.aliases[id.0]
    }

    pub(super) fn entry_mut(&mut self, id: AliasId) -> &mut AliasEntry<'a> {
        &mut self.aliases[id.0]
    }

    pub(super) fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

///
/// TESTS
///
