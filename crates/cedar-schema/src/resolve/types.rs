//! Type walker: turns written `Type`s into `ResolvedType`s inside a given
//! namespace scope, inlining common types on the way.

use super::{
    ResolveError, Resolver,
    scope::{AliasId, AliasState},
};
use crate::{
    name::{EntityType, Identifier, Path},
    obs::ResolveEvent,
    resolved::{ResolvedAttr, ResolvedRecord, ResolvedType},
    types::{CEDAR_NAMESPACE, Extension, RecordType, Type},
};

impl Resolver<'_, '_> {
    pub(super) fn resolve_type(
        &mut self,
        ns: &Path,
        ty: &Type,
    ) -> Result<ResolvedType, ResolveError> {
        let resolved = match ty {
            Type::String => ResolvedType::String,
            Type::Long => ResolvedType::Long,
            Type::Bool => ResolvedType::Bool,
            Type::Extension(name) => self.resolve_extension(name)?,
            Type::Set(element) => ResolvedType::set(self.resolve_type(ns, element)?),
            Type::Record(record) => ResolvedType::Record(self.resolve_record(ns, record)?),
            Type::Entity(name) => ResolvedType::Entity(self.qualify_entity_ref(ns, name)),
            Type::TypeRef(path) => self.resolve_type_ref(ns, path)?,
        };

        Ok(resolved)
    }

    pub(super) fn resolve_record(
        &mut self,
        ns: &Path,
        record: &RecordType,
    ) -> Result<ResolvedRecord, ResolveError> {
        let attrs = record
            .attrs
            .iter()
            .map(|attr| {
                Ok(ResolvedAttr {
                    name: attr.name.clone(),
                    ty: self.resolve_type(ns, &attr.ty)?,
                    required: attr.required,
                    annotations: attr.annotations.clone(),
                })
            })
            .collect::<Result<_, ResolveError>>()?;

        Ok(ResolvedRecord { attrs })
    }

    /// Entity reference qualification: verbatim when qualified, the global
    /// name when one is declared, otherwise prefixed with `ns`.
    pub(super) fn qualify_entity_ref(&self, ns: &Path, name: &EntityType) -> EntityType {
        if name.is_qualified() {
            return name.unrooted();
        }

        match name.basename() {
            Some(base) if !ns.is_global() && !self.scope.is_global_declared(base) => {
                EntityType::in_namespace(ns, base.clone())
            }
            _ => name.clone(),
        }
    }

    fn resolve_extension(&mut self, name: &Identifier) -> Result<ResolvedType, ResolveError> {
        if let Some(ext) = Extension::from_name(name) {
            return Ok(ResolvedType::Extension(ext));
        }
        if self.options.strict_extensions {
            return Err(ResolveError::UnknownExtension { name: name.clone() });
        }

        Ok(self.opaque(EntityType::from(name.clone())))
    }

    fn resolve_type_ref(&mut self, ns: &Path, path: &Path) -> Result<ResolvedType, ResolveError> {
        let Some(base) = path.basename() else {
            return Err(ResolveError::EmptyTypeRef);
        };

        if path.is_qualified() {
            let prefix = path.namespace();

            if let Some(id) = self.scope.alias_in(&prefix, base) {
                return self.expand_alias(id);
            }
            if matches!(prefix.segments(), [only] if only.as_str() == CEDAR_NAMESPACE)
                && let Some(builtin) = builtin(base)
            {
                return Ok(builtin);
            }
            let name = EntityType::new(path.unrooted()).map_err(|_| ResolveError::EmptyTypeRef)?;

            return Ok(self.opaque(name));
        }

        if !ns.is_global()
            && let Some(id) = self.scope.alias_in(ns, base)
        {
            return self.expand_alias(id);
        }
        if let Some(id) = self.scope.global_alias(base) {
            return self.expand_alias(id);
        }
        if let Some(builtin) = builtin(base) {
            return Ok(builtin);
        }

        // an ambiguous name lands on a declared entity when there is one
        let local = EntityType::in_namespace(ns, base.clone());
        let name = if self.scope.is_declared(&local) {
            local
        } else {
            EntityType::from(base.clone())
        };

        Ok(self.opaque(name))
    }

    fn opaque(&mut self, name: EntityType) -> ResolvedType {
        tracing::debug!(name = %name, "unresolved type name kept as entity reference");
        self.sink.record(ResolveEvent::OpaqueReference { name: &name });

        ResolvedType::Entity(name)
    }

    /// Inline a common type, expanding it in its own declaring namespace the
    /// first time and serving the cached result afterwards.
    pub(super) fn expand_alias(&mut self, id: AliasId) -> Result<ResolvedType, ResolveError> {
        match &self.scope.entry(id).state {
            AliasState::Resolved(ty) => {
                let ty = ty.clone();
                let alias = &self.scope.entry(id).name;
                tracing::trace!(alias = %alias, "common type cache hit");
                self.sink.record(ResolveEvent::AliasCacheHit { alias });

                return Ok(ty);
            }
            AliasState::Expanding => return Err(self.cycle_error(id)),
            AliasState::Pending => {}
        }

        let entry = self.scope.entry_mut(id);
        entry.state = AliasState::Expanding;
        let decl = entry.decl;
        let namespace = entry.namespace.clone();

        self.stack.push(id);
        let result = self.resolve_type(&namespace, &decl.ty);
        self.stack.pop();

        let entry = self.scope.entry_mut(id);
        match result {
            Ok(ty) => {
                entry.state = AliasState::Resolved(ty.clone());
                let alias = &self.scope.entry(id).name;
                tracing::trace!(alias = %alias, ty = %ty, "common type expanded");
                self.sink.record(ResolveEvent::AliasExpanded { alias });

                Ok(ty)
            }
            Err(err) => {
                entry.state = AliasState::Pending;

                Err(err)
            }
        }
    }

    // `id` is already on the stack; the cycle runs from there back to `id`.
    fn cycle_error(&self, id: AliasId) -> ResolveError {
        let start = self.stack.iter().position(|open| *open == id).unwrap_or(0);
        let cycle = self.stack[start..]
            .iter()
            .chain(std::iter::once(&id))
            .map(|open| self.scope.entry(*open).name.clone())
            .collect();

        ResolveError::AliasCycle { cycle }
    }
}

// Names that denote built-in types when no common type shadows them.
fn builtin(name: &Identifier) -> Option<ResolvedType> {
    match name.as_str() {
        "String" => Some(ResolvedType::String),
        "Long" => Some(ResolvedType::Long),
        "Bool" | "Boolean" => Some(ResolvedType::Bool),
        other => Extension::from_name(other).map(ResolvedType::Extension),
    }
}
