//! Module: ast
//! Responsibility: the schema as written (namespaces, declarations) and
//! chainable builders for both.
//! Does not own: name qualification or alias inlining (see `resolve`).

mod decl;

pub use decl::*;

use crate::{
    name::{Identifier, Path},
    resolve::{ResolveError, resolve},
    resolved::ResolvedSchema,
    types::{Annotation, Annotations},
};
use serde::{Deserialize, Serialize};

///
/// Schema
///
/// Ordered top-level nodes. The same namespace path may appear in several
/// nodes; their declarations are unioned at resolution time.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schema {
    nodes: Vec<Node>,
}

impl Schema {
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.nodes.push(node.into());
    }

    /// Append a namespace block.
    #[must_use]
    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.nodes.push(Node::Namespace(namespace));
        self
    }

    /// Append a bare (global) declaration.
    #[must_use]
    pub fn declare(mut self, decl: impl Into<Declaration>) -> Self {
        self.nodes.push(Node::Declaration(decl.into()));
        self
    }

    /// Every declaration paired with the namespace it was written in.
    pub fn declarations(&self) -> impl Iterator<Item = (&Path, &Declaration)> + '_ {
        const GLOBAL: &Path = &Path::global();

        self.nodes.iter().flat_map(|node| {
            let items: Box<dyn Iterator<Item = (&Path, &Declaration)> + '_> = match node {
                Node::Namespace(ns) => {
                    Box::new(ns.declarations.iter().map(move |decl| (&ns.path, decl)))
                }
                Node::Declaration(decl) => Box::new(std::iter::once((GLOBAL, decl))),
            };

            items
        })
    }

    /// Resolve with default options.
    pub fn resolve(&self) -> Result<ResolvedSchema, ResolveError> {
        resolve(self)
    }
}

impl FromIterator<Node> for Schema {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

///
/// Node
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Node {
    Namespace(Namespace),
    Declaration(Declaration),
}

impl From<Namespace> for Node {
    fn from(ns: Namespace) -> Self {
        Self::Namespace(ns)
    }
}

impl From<Declaration> for Node {
    fn from(decl: Declaration) -> Self {
        Self::Declaration(decl)
    }
}

///
/// Namespace
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Namespace {
    pub path: Path,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,

    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl Namespace {
    #[must_use]
    pub const fn new(path: Path) -> Self {
        Self {
            path,
            annotations: Annotations::new(),
            declarations: Vec::new(),
        }
    }

    #[must_use]
    pub fn annotation(mut self, key: Identifier, value: impl Into<String>) -> Self {
        self.annotations.push(Annotation::new(key, value));
        self
    }

    /// Append a declaration, keeping source order.
    #[must_use]
    pub fn declare(mut self, decl: impl Into<Declaration>) -> Self {
        self.declarations.push(decl.into());
        self
    }
}

///
/// TESTS
///
