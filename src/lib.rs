//! Path-based ACL engine for a secrets-management server.
//!
//! Policies are parsed documents of path rules. [`Acl::new`] compiles a
//! set of them into an immutable [`Acl`] with deny-sticky union merging;
//! [`Acl::allow_operation`] then evaluates requests against the single
//! most specific matching rule.

pub use acl::Acl;
pub use error::AclError;
pub use types::{
    AclRequest, CapabilitiesBitmap, Capability, Decision, DenyReason, Operation, ParamValue,
    PathRule, Policy, PolicyInfo, PolicyShorthand, ROOT_POLICY_NAME,
};

mod acl;
mod error;
mod pattern;
pub mod types;

#[cfg(test)]
mod tests;
