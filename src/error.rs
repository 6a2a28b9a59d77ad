//! Error types for variable registration and expression compilation.
//!
//! Only caller mistakes are reported through [`Error`]. A broken
//! canonicalization invariant is a bug in this crate and panics instead.

use thiserror::Error;

use crate::expr::ExprId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("expected at least one variable name")]
    EmptyNames,
    #[error("variable name at position {position} is empty")]
    EmptyName { position: usize },
    #[error("expected index to be >= 0, got {index}")]
    NegativeIndex { index: i64 },
    #[error("malformed expression at node {node}: {reason}")]
    Structural { node: ExprId, reason: String },
}

impl Error {
    /// Returns true for malformed variable registration requests.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::EmptyNames | Error::EmptyName { .. } | Error::NegativeIndex { .. }
        )
    }

    /// Returns true for malformed expression trees.
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Structural { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
