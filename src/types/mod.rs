//! Core data types of the policy engine.

pub mod capability;
pub mod decision;
pub mod operation;
pub mod param_value;
mod permissions;
pub mod policy;
pub mod request;

pub use capability::{CapabilitiesBitmap, Capability, PolicyShorthand};
pub use decision::{Decision, DenyReason, PolicyInfo};
pub use operation::Operation;
pub use param_value::ParamValue;
pub use policy::{PathRule, Policy, ROOT_POLICY_NAME};
pub use request::AclRequest;

pub(crate) use permissions::Permissions;
