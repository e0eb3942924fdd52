//! Cedar schema intermediate representation and namespace-aware resolver.
//!
//! A `Schema` is built from namespaces and declarations as written; `resolve`
//! turns it into a `ResolvedSchema` whose names are fully qualified and whose
//! common types are inlined. `ResolvedSchema::to_schema` projects back to a
//! canonical `Schema`.

pub mod ast;
pub mod name;
pub mod obs;
pub mod resolve;
pub mod resolved;
pub mod types;

pub use resolve::{ResolveError, ResolveOptions, resolve, resolve_with};

use crate::name::NameError;
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        ast::*,
        name::{ActionUid, EntityType, Identifier, Path},
        obs::{NoopSink, ResolveReport, ResolveSink},
        resolve::{ResolveError, ResolveOptions, resolve, resolve_with},
        resolved::{
            DeclarationRef, ResolvedAction, ResolvedEntity, ResolvedEnum, ResolvedSchema,
            ResolvedType,
        },
        types::{Annotation, Annotations, Extension, RecordAttr, RecordType, Type},
    };
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    NameError(#[from] NameError),

    #[error(transparent)]
    ResolveError(#[from] ResolveError),
}
