use serde::{Deserialize, Serialize};

///
/// ResolveOptions
///
/// Per-call resolver configuration. Every field defaults to the lenient
/// behaviour, so an empty JSON object is a valid configuration.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveOptions {
    /// Reject extension types outside the known set instead of degrading
    /// them to opaque entity references.
    pub strict_extensions: bool,
}

impl ResolveOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strict_extensions: false,
        }
    }

    /// Every strict check enabled.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            strict_extensions: true,
        }
    }

    #[must_use]
    pub const fn with_strict_extensions(mut self, strict: bool) -> Self {
        self.strict_extensions = strict;
        self
    }
}

///
/// TESTS
///
