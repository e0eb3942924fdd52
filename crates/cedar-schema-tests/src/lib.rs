//! Schema fixtures built through the public builder API, plus end-to-end
//! resolution tests over them.

pub mod fixtures;

#[cfg(test)]
mod e2e;

pub mod prelude {
    pub use cedar_schema::{Error, prelude::*};
}
