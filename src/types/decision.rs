//! Authorization decision types.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Identifies a policy that granted the evaluated operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct PolicyInfo {
    pub name: String,
}

/// Why an operation was denied. Every deny carries exactly one reason;
/// "access denied" is an expected result, not an error.
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
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Malformed caller input, e.g. an empty path. Authorization fails
    /// closed rather than panicking.
    InvalidRequest,
    /// No compiled rule matches the path.
    NoMatchingRule,
    /// The most specific matching rule carries the `deny` capability.
    ExplicitDeny,
    /// The matching rule does not grant the operation's capability.
    CapabilityNotGranted,
    /// The path is root-protected and the matching rule lacks `sudo`.
    SudoRequired,
    /// A request-data key or value is listed under `denied_parameters`.
    ParameterDenied,
    /// A request-data key or value falls outside `allowed_parameters`.
    ParameterNotAllowed,
    /// A `required_parameters` key is absent from the request data.
    MissingRequiredParameter,
    /// The requested response-wrapping TTL violates the rule's bounds, or
    /// wrapping was not requested while a bound demands it.
    WrappingTtlOutOfRange,
}

/// The outcome of evaluating one operation against a compiled ACL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Decision {
    Allow {
        /// True when access came via the literal root policy, or when the
        /// matched rule carries `sudo`.
        root_privilege: bool,
        /// MFA methods of which at least one must be satisfied by the
        /// request layer before it may proceed. Sorted; empty when no MFA
        /// constraint applies.
        mfa_methods: Vec<String>,
        /// Policies that contributed the granted capability, in the order
        /// they were supplied to the builder.
        granting_policies: Vec<PolicyInfo>,
    },
    Deny {
        reason: DenyReason,
    },
}

impl Decision {
    pub(crate) fn allow() -> Self {
        Decision::Allow {
            root_privilege: false,
            mfa_methods: Vec::new(),
            granting_policies: Vec::new(),
        }
    }

    pub(crate) fn deny(reason: DenyReason) -> Self {
        Decision::Deny { reason }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }

    /// The deny reason, if this is a deny.
    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow { .. } => None,
            Decision::Deny { reason } => Some(*reason),
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Decision::Allow { root_privilege, .. } => {
                write!(f, "Allow(root_privilege={root_privilege})")
            }
            Decision::Deny { reason } => write!(f, "Deny({reason})"),
        }
    }
}
