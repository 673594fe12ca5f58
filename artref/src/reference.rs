//! Artifact reference parsing.
//!
//! Handles references of the form `[registry/]repository[:tag|@digest]`:
//! - `hello-world` → repository `hello-world`
//! - `ns/app:v1.0` → repository `ns/app`, tag `v1.0`
//! - `registry.example.com/ns/app@sha256:…` → registry, repository and digest
//!
//! Parsing only recognizes syntax. No default registry or tag is filled in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::grammar::{self, Parts, Suffix};
use crate::{Error, Result};

/// A parsed artifact reference.
///
/// Only produced by [`Reference::parse`]; the fields cannot be changed
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    registry: Option<String>,
    repository: String,
    identifier: Option<Identifier>,
}

/// Tag or digest identifier for an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Identifier {
    /// Named tag (e.g., `latest`, `v1.0`).
    Tag(String),
    /// Content-addressable digest (e.g., `sha256:abc123...`).
    Digest(String),
}

impl Identifier {
    /// Returns the tag or digest without its `:` or `@` delimiter.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Tag(s) | Self::Digest(s) => s,
        }
    }
}

impl Reference {
    /// Parses a reference string.
    ///
    /// The whole input must match the grammar; leading or trailing
    /// whitespace is rejected like any other stray character.
    pub fn parse(input: &str) -> Result<Self> {
        match grammar::reference(input) {
            Ok(parts) => {
                let reference = Self::from(parts);
                tracing::debug!(
                    registry = reference.registry(),
                    repository = reference.repository(),
                    tag = reference.tag(),
                    digest = reference.digest(),
                    "parsed reference"
                );
                Ok(reference)
            }
            Err(reason) => {
                tracing::debug!(input, reason, "rejected reference");
                Err(Error::InvalidReferenceSyntax {
                    input: input.to_owned(),
                    reason,
                })
            }
        }
    }

    /// Registry host, including any `:port`, when the reference names one.
    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    /// Slash-separated repository path.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Tag, when the reference carries one.
    pub fn tag(&self) -> Option<&str> {
        match &self.identifier {
            Some(Identifier::Tag(t)) => Some(t),
            _ => None,
        }
    }

    /// Digest in `algorithm:hex` form.
    pub fn digest(&self) -> Option<&str> {
        match &self.identifier {
            Some(Identifier::Digest(d)) => Some(d),
            _ => None,
        }
    }

    /// Tag or digest, whichever the reference carries.
    pub fn identifier(&self) -> Option<&Identifier> {
        self.identifier.as_ref()
    }

    /// Algorithm half of the digest (e.g., `sha256`).
    pub fn digest_algorithm(&self) -> Option<&str> {
        self.digest_parts().map(|(algorithm, _)| algorithm)
    }

    /// Hex half of the digest.
    pub fn digest_hex(&self) -> Option<&str> {
        self.digest_parts().map(|(_, hex)| hex)
    }

    fn digest_parts(&self) -> Option<(&str, &str)> {
        self.digest().and_then(|d| d.split_once(':'))
    }
}

impl From<Parts<'_>> for Reference {
    fn from(parts: Parts<'_>) -> Self {
        Self {
            registry: parts.registry.map(str::to_owned),
            repository: parts.repository.to_owned(),
            identifier: parts.suffix.map(|suffix| match suffix {
                Suffix::Tag(t) => Identifier::Tag(t.to_owned()),
                Suffix::Digest(d) => Identifier::Digest(d.to_owned()),
            }),
        }
    }
}

impl FromStr for Reference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(registry) = &self.registry {
            write!(f, "{registry}/")?;
        }
        f.write_str(&self.repository)?;
        match &self.identifier {
            Some(Identifier::Tag(t)) => write!(f, ":{t}"),
            Some(Identifier::Digest(d)) => write!(f, "@{d}"),
            None => Ok(()),
        }
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
