//! The merged permission set compiled from every rule sharing one pattern.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::time::Duration;

use crate::error::AclError;

use super::capability::{CapabilitiesBitmap, Capability, PolicyShorthand};
use super::decision::{DenyReason, PolicyInfo};
use super::param_value::ParamValue;
use super::policy::PathRule;

/// The compiled permission set of one merged rule node.
///
/// Built once per distinct pattern string when the ACL is compiled, then
/// read-only. Parameter keys are stored ASCII-lowercased; request keys are
/// lowered at evaluation time to match.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Permissions {
    pub(crate) capabilities: CapabilitiesBitmap,
    pub(crate) allowed_parameters: HashMap<String, Vec<ParamValue>>,
    pub(crate) denied_parameters: HashMap<String, Vec<ParamValue>>,
    pub(crate) required_parameters: BTreeSet<String>,
    pub(crate) min_wrapping_ttl: Duration,
    pub(crate) max_wrapping_ttl: Duration,
    pub(crate) mfa_methods: BTreeSet<String>,
    /// Capability bit -> names of the policies that contributed it.
    granting: HashMap<u32, Vec<String>>,
    pub(crate) contributing_policy_count: usize,
}

fn lowered_keys(map: &HashMap<String, Vec<ParamValue>>) -> HashMap<String, Vec<ParamValue>> {
    map.iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
        .collect()
}

impl Permissions {
    /// Compile one parsed path rule into a permission set, resolving the
    /// shorthand and capability tokens. Unknown tokens are fatal.
    pub(crate) fn from_rule(rule: &PathRule, policy_name: &str) -> Result<Self, AclError> {
        let mut capabilities = CapabilitiesBitmap::default();
        if let Some(shorthand) = &rule.policy {
            let shorthand = PolicyShorthand::from_str(shorthand)
                .map_err(|_| AclError::UnknownPolicyShorthand(shorthand.clone()))?;
            capabilities = capabilities.union(shorthand.capabilities());
        }
        for token in &rule.capabilities {
            let capability = Capability::from_str(token)
                .map_err(|_| AclError::UnknownCapability(token.clone()))?;
            capabilities.insert(capability);
        }

        let mut granting: HashMap<u32, Vec<String>> = HashMap::new();
        if !capabilities.contains(Capability::Deny) {
            use strum::IntoEnumIterator;
            for capability in Capability::iter() {
                if capability != Capability::Deny && capabilities.contains(capability) {
                    granting.insert(capability.bit(), vec![policy_name.to_string()]);
                }
            }
        }

        Ok(Permissions {
            capabilities,
            allowed_parameters: lowered_keys(&rule.allowed_parameters),
            denied_parameters: lowered_keys(&rule.denied_parameters),
            required_parameters: rule
                .required_parameters
                .iter()
                .map(|k| k.to_ascii_lowercase())
                .collect(),
            min_wrapping_ttl: rule.min_wrapping_ttl,
            max_wrapping_ttl: rule.max_wrapping_ttl,
            mfa_methods: rule.mfa_methods.iter().cloned().collect(),
            granting,
            contributing_policy_count: 1,
        })
    }

    /// Deny-sticky union of a later contribution into this node.
    ///
    /// A node already stamped `deny` is frozen. An incoming `deny` stamps
    /// the node: the bitmap becomes exactly `{deny}` and granting records
    /// are dropped, so no later contribution can widen the pattern again.
    pub(crate) fn merge(&mut self, other: &Permissions) {
        self.contributing_policy_count += other.contributing_policy_count;

        if self.capabilities.contains(Capability::Deny) {
            return;
        }
        if other.capabilities.contains(Capability::Deny) {
            self.capabilities = CapabilitiesBitmap::deny_only();
            self.granting.clear();
            return;
        }

        self.capabilities = self.capabilities.union(other.capabilities);
        for (bit, names) in &other.granting {
            let entry = self.granting.entry(*bit).or_default();
            for name in names {
                if !entry.contains(name) {
                    entry.push(name.clone());
                }
            }
        }

        merge_parameter_map(&mut self.allowed_parameters, &other.allowed_parameters);
        merge_parameter_map(&mut self.denied_parameters, &other.denied_parameters);
        self.required_parameters
            .extend(other.required_parameters.iter().cloned());
        self.mfa_methods.extend(other.mfa_methods.iter().cloned());

        // Tighter wrapping bound wins; an unset bound adopts the incoming one.
        if other.min_wrapping_ttl != Duration::ZERO
            && (self.min_wrapping_ttl == Duration::ZERO
                || other.min_wrapping_ttl > self.min_wrapping_ttl)
        {
            self.min_wrapping_ttl = other.min_wrapping_ttl;
        }
        if other.max_wrapping_ttl != Duration::ZERO
            && (self.max_wrapping_ttl == Duration::ZERO
                || other.max_wrapping_ttl < self.max_wrapping_ttl)
        {
            self.max_wrapping_ttl = other.max_wrapping_ttl;
        }
    }

    /// Evaluate the parameter constraints against request data, returning
    /// the first violated constraint's reason.
    pub(crate) fn check_parameters(&self, data: &HashMap<String, ParamValue>) -> Option<DenyReason> {
        if self.denied_parameters.contains_key("*") && !data.is_empty() {
            return Some(DenyReason::ParameterDenied);
        }
        for (key, value) in data {
            let key = key.to_ascii_lowercase();
            if let Some(listed) = self.denied_parameters.get(&key) {
                if listed.is_empty() || listed.iter().any(|p| value.matches(p)) {
                    return Some(DenyReason::ParameterDenied);
                }
            }
        }

        if !self.allowed_parameters.is_empty() {
            let wildcard = self.allowed_parameters.contains_key("*");
            for (key, value) in data {
                let key = key.to_ascii_lowercase();
                match self.allowed_parameters.get(&key) {
                    // A key listed with specific values must value-match
                    // even when "*" admits unlisted keys.
                    Some(listed) if !listed.is_empty() => {
                        if !listed.iter().any(|p| value.matches(p)) {
                            return Some(DenyReason::ParameterNotAllowed);
                        }
                    }
                    Some(_) => {}
                    None if wildcard => {}
                    None => return Some(DenyReason::ParameterNotAllowed),
                }
            }
        }

        for required in &self.required_parameters {
            if !data.keys().any(|k| k.eq_ignore_ascii_case(required)) {
                return Some(DenyReason::MissingRequiredParameter);
            }
        }
        None
    }

    /// Whether the requested wrapping TTL satisfies this node's bounds.
    /// When a bound is set, a request without wrapping is out of range.
    pub(crate) fn check_wrapping_ttl(&self, requested: Option<Duration>) -> bool {
        if self.max_wrapping_ttl != Duration::ZERO {
            match requested {
                Some(ttl) if ttl <= self.max_wrapping_ttl => {}
                _ => return false,
            }
        }
        if self.min_wrapping_ttl != Duration::ZERO {
            match requested {
                Some(ttl) if ttl >= self.min_wrapping_ttl => {}
                _ => return false,
            }
        }
        true
    }

    /// Policies that contributed the given capability bit, in input order.
    pub(crate) fn granting_policies(&self, capability: Capability) -> Vec<PolicyInfo> {
        self.granting
            .get(&capability.bit())
            .map(|names| {
                names
                    .iter()
                    .map(|name| PolicyInfo { name: name.clone() })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Sorted MFA method names, for surfacing in an allow decision.
    pub(crate) fn mfa_method_names(&self) -> Vec<String> {
        self.mfa_methods.iter().cloned().collect()
    }
}

/// Union one parameter map into another, key by key. An empty value list
/// means "any value" for that key and absorbs specific values from either
/// side; otherwise lists concatenate, skipping values already present.
fn merge_parameter_map(
    into: &mut HashMap<String, Vec<ParamValue>>,
    from: &HashMap<String, Vec<ParamValue>>,
) {
    for (key, values) in from {
        match into.entry(key.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(values.clone());
            }
            Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                if existing.is_empty() {
                    // Already any-value for this key.
                } else if values.is_empty() {
                    existing.clear();
                } else {
                    for value in values {
                        if !existing.contains(value) {
                            existing.push(value.clone());
                        }
                    }
                }
            }
        }
    }
}
