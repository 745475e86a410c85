use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while compiling policies into an ACL.
///
/// Evaluation never returns an error: access decisions are values
/// (`Decision`), not failures. These variants are fatal to construction;
/// a caller must not route requests through a partially built ACL.
#[derive(Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum AclError {
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    #[error("unknown policy shorthand: {0}")]
    UnknownPolicyShorthand(String),

    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPathPattern { pattern: String, reason: String },
}
