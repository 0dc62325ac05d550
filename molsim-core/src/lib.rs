//! Shared primitives for the molsim similarity-search workspace.
//!
//! `molsim-core` provides the foundation the other molsim crates build on:
//!
//! - **Error types**: [`MolsimError`] and [`Result`] for structured error handling
//! - **Traits**: small abstractions like [`ContentAddressable`] and [`Scored`]
//! - **Hashing**: SHA-256 content digests used to key caches on file contents

pub mod error;
pub mod hash;
pub mod traits;

pub use error::{MolsimError, Result};
pub use traits::*;
