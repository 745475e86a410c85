//! Request operations and their capability mapping.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::capability::Capability;

/// The verb a request performs against a path.
///
/// Operations are not capabilities: `help` is never gated and maps to no
/// capability bit, while `deny` and `sudo` are capability markers that no
/// request can perform directly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
    Patch,
    Recover,
    Help,
}

impl Operation {
    /// The capability a merged path rule must grant for this operation.
    /// `None` for `help`, which bypasses capability checks entirely.
    pub fn required_capability(self) -> Option<Capability> {
        match self {
            Operation::Create => Some(Capability::Create),
            Operation::Read => Some(Capability::Read),
            Operation::Update => Some(Capability::Update),
            Operation::Delete => Some(Capability::Delete),
            Operation::List => Some(Capability::List),
            Operation::Patch => Some(Capability::Patch),
            Operation::Recover => Some(Capability::Recover),
            Operation::Help => None,
        }
    }
}
