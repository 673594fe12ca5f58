//! Parser for container artifact references.
//!
//! Recognizes `[registry/]repository[:tag]` and `[registry/]repository[@digest]`
//! strings and splits them into their parts. Parsing is pure: nothing is
//! resolved against a registry and no defaults are filled in.

#![allow(clippy::missing_docs_in_private_items)]

mod grammar;
pub mod reference;

pub use reference::{Identifier, Reference};

/// Result type for artref operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from reference parsing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The input does not match the reference grammar in its entirety.
    #[error("invalid reference syntax `{input}`: {reason}")]
    InvalidReferenceSyntax {
        /// The rejected input, unchanged.
        input: String,
        /// The grammar rule that failed.
        reason: &'static str,
    },
}
