use crate::{
    ThisError,
    name::{ActionUid, EntityType, Identifier, Path},
};
use std::fmt;

///
/// ResolveError
///
/// First fatal condition met while resolving a schema. Resolution never
/// returns a partial result alongside one of these.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResolveError {
    #[error("action {uid} is declared more than once")]
    ActionDuplicate { uid: ActionUid },

    #[error("common type cycle: {}", AliasChain(.cycle))]
    AliasCycle { cycle: Vec<Path> },

    #[error("common type '{name}' is declared more than once")]
    CommonTypeDuplicate { name: Path },

    #[error("context of action {action} must be a record, found {found}")]
    ContextNotRecord { action: ActionUid, found: String },

    #[error("type reference has an empty path")]
    EmptyTypeRef,

    #[error("entity type '{name}' is declared more than once")]
    EntityDuplicate { name: EntityType },

    #[error("'{name}' is declared as both an entity type and an enum entity type")]
    EntityEnumClash { name: EntityType },

    #[error("enum entity type '{name}' is declared more than once")]
    EnumDuplicate { name: EntityType },

    #[error("snapshot key '{key}' does not match stored name '{name}'")]
    SnapshotKeyMismatch { key: String, name: String },

    #[error("snapshot stores rooted name '{name}'")]
    SnapshotRootedName { name: String },

    #[error("unknown extension type '{name}'")]
    UnknownExtension { name: Identifier },
}

impl ResolveError {
    /// Fully-qualified name the error is about, when there is a single one.
    #[must_use]
    pub fn subject(&self) -> Option<String> {
        match self {
            Self::ActionDuplicate { uid } => Some(uid.to_string()),
            Self::ContextNotRecord { action, .. } => Some(action.to_string()),
            Self::CommonTypeDuplicate { name } => Some(name.to_string()),
            Self::EntityDuplicate { name }
            | Self::EntityEnumClash { name }
            | Self::EnumDuplicate { name } => Some(name.to_string()),
            Self::SnapshotKeyMismatch { key, .. } => Some(key.clone()),
            Self::SnapshotRootedName { name } => Some(name.clone()),
            Self::UnknownExtension { name } => Some(name.to_string()),
            Self::AliasCycle { .. } | Self::EmptyTypeRef => None,
        }
    }
}

// `A -> B -> A`
struct AliasChain<'a>(&'a [Path]);

impl fmt::Display for AliasChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, alias) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{alias}")?;
        }

        Ok(())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_cycle_message_lists_chain() {
        let cycle = ["A", "B", "A"].map(|s| Path::parse(s).unwrap()).to_vec();
        let err = ResolveError::AliasCycle { cycle };

        assert_eq!(err.to_string(), "common type cycle: A -> B -> A");
        assert_eq!(err.subject(), None);
    }

    #[test]
    fn context_error_names_the_action() {
        let err = ResolveError::ContextNotRecord {
            action: ActionUid::in_namespace(&Path::global(), "view"),
            found: "String".into(),
        };

        assert_eq!(
            err.to_string(),
            "context of action Action::\"view\" must be a record, found String"
        );
        assert_eq!(err.subject().as_deref(), Some("Action::\"view\""));
    }

    #[test]
    fn snapshot_errors_name_the_offending_key() {
        let mismatch = ResolveError::SnapshotKeyMismatch {
            key: "X".into(),
            name: "Y".into(),
        };
        let rooted = ResolveError::SnapshotRootedName { name: "::G".into() };

        assert_eq!(
            mismatch.to_string(),
            "snapshot key 'X' does not match stored name 'Y'"
        );
        assert_eq!(mismatch.subject().as_deref(), Some("X"));
        assert_eq!(rooted.subject().as_deref(), Some("::G"));
    }
}
