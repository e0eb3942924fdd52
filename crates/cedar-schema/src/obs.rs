//! Resolution telemetry boundary.
//!
//! The resolver never aggregates counters itself; every observable step is
//! emitted as a `ResolveEvent` to the `ResolveSink` passed by the caller.
//! Logging goes through `tracing` independently of any sink.

use crate::{
    ast::DeclKind,
    name::{EntityType, Path},
};
use serde::{Deserialize, Serialize};

///
/// ResolveEvent
///

#[derive(Clone, Copy, Debug)]
pub enum ResolveEvent<'a> {
    AliasCacheHit {
        alias: &'a Path,
    },
    AliasExpanded {
        alias: &'a Path,
    },
    DeclarationResolved {
        kind: DeclKind,
    },
    NamespaceMerged {
        path: &'a Path,
    },
    OpaqueReference {
        name: &'a EntityType,
    },
}

///
/// ResolveSink
///

pub trait ResolveSink {
    fn record(&mut self, event: ResolveEvent<'_>);
}

///
/// NoopSink
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl ResolveSink for NoopSink {
    fn record(&mut self, _: ResolveEvent<'_>) {}
}

///
/// ResolveReport
/// Counter sink summarising one or more resolutions.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResolveReport {
    // declarations by kind
    pub common_types: u64,
    pub entities: u64,
    pub enums: u64,
    pub actions: u64,

    // alias cache
    pub alias_expansions: u64,
    pub alias_cache_hits: u64,

    pub namespaces_merged: u64,
    pub opaque_references: u64,
}

impl ResolveReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total declarations resolved, all kinds.
    #[must_use]
    pub const fn declarations(&self) -> u64 {
        self.common_types
            .saturating_add(self.entities)
            .saturating_add(self.enums)
            .saturating_add(self.actions)
    }
}

impl ResolveSink for ResolveReport {
    fn record(&mut self, event: ResolveEvent<'_>) {
        match event {
            ResolveEvent::AliasCacheHit { .. } => {
                self.alias_cache_hits = self.alias_cache_hits.saturating_add(1);
            }
            ResolveEvent::AliasExpanded { .. } => {
                self.alias_expansions = self.alias_expansions.saturating_add(1);
            }
            ResolveEvent::DeclarationResolved { kind } => {
                let counter = match kind {
                    DeclKind::CommonType => &mut self.common_types,
                    DeclKind::Entity => &mut self.entities,
                    DeclKind::Enum => &mut self.enums,
                    DeclKind::Action => &mut self.actions,
                };
                *counter = counter.saturating_add(1);
            }
            ResolveEvent::NamespaceMerged { .. } => {
                self.namespaces_merged = self.namespaces_merged.saturating_add(1);
            }
            ResolveEvent::OpaqueReference { .. } => {
                self.opaque_references = self.opaque_references.saturating_add(1);
            }
        }
    }
}
