//! The compiled ACL: policy merging and per-request evaluation.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::debug;

use crate::error::AclError;
use crate::pattern::{PathPattern, SegmentPattern};
use crate::types::{
    AclRequest, Capability, Decision, DenyReason, Operation, Permissions, Policy,
};

/// One compiled segment-wildcard rule.
#[derive(Debug, Clone)]
struct SegmentRule {
    pattern: SegmentPattern,
    permissions: Permissions,
}

/// The immutable result of merging one or more policies.
///
/// Compiled once per distinct policy set held by a caller and safe to share
/// across threads; evaluation takes `&self` and never blocks. Callers are
/// expected to cache compiled ACLs per policy-name set and invalidate on
/// policy mutation; the crate keeps no global cache.
#[derive(Debug, Clone, Default)]
pub struct Acl {
    exact: HashMap<String, Permissions>,
    /// Keyed by literal prefix (the pattern's trailing `*` stripped).
    prefixes: HashMap<String, Permissions>,
    segment_rules: Vec<SegmentRule>,
    root: bool,
}

impl Acl {
    /// Compile a set of policies into an ACL.
    ///
    /// Rules sharing one pattern string, within or across policies, merge
    /// with deny-sticky union semantics. The input order of equal policy
    /// sets does not affect the merged result. A policy named `root` sets
    /// the root flag; its path rules are validated but never indexed.
    pub fn new(policies: &[Policy]) -> Result<Acl, AclError> {
        let mut acl = Acl::default();

        for policy in policies {
            if policy.is_root() {
                acl.root = true;
                for rule in &policy.paths {
                    PathPattern::classify(&rule.path)?;
                }
                continue;
            }

            for rule in &policy.paths {
                let pattern = PathPattern::classify(&rule.path)?;
                let permissions = Permissions::from_rule(rule, &policy.name)?;
                match pattern {
                    PathPattern::Exact(path) => merge_into(&mut acl.exact, path, permissions),
                    PathPattern::Prefix(prefix) => {
                        merge_into(&mut acl.prefixes, prefix, permissions)
                    }
                    PathPattern::Segments(pattern) => {
                        match acl
                            .segment_rules
                            .iter_mut()
                            .find(|r| r.pattern.raw() == pattern.raw())
                        {
                            Some(existing) => existing.permissions.merge(&permissions),
                            None => acl.segment_rules.push(SegmentRule {
                                pattern,
                                permissions,
                            }),
                        }
                    }
                }
            }
        }

        debug!(
            event = "BuildAcl",
            policies = policies.len(),
            exact = acl.exact.len(),
            prefixes = acl.prefixes.len(),
            segment_rules = acl.segment_rules.len(),
            root = acl.root
        );
        Ok(acl)
    }

    /// Evaluate one request against the compiled rules.
    pub fn allow_operation(&self, request: &AclRequest) -> Decision {
        let decision = self.evaluate(request);
        debug!(
            event = "AllowOperation",
            operation = %request.operation,
            path = %request.path,
            decision = %decision
        );
        decision
    }

    fn evaluate(&self, request: &AclRequest) -> Decision {
        if request.path.is_empty() {
            return Decision::deny(DenyReason::InvalidRequest);
        }
        if self.root {
            return Decision::Allow {
                root_privilege: true,
                mfa_methods: Vec::new(),
                granting_policies: Vec::new(),
            };
        }
        // Help and documentation retrieval is never gated.
        let Some(capability) = request.operation.required_capability() else {
            return Decision::allow();
        };

        let path = strip_leading_slash(&request.path);
        let Some(permissions) = self.find_permissions(path) else {
            return Decision::deny(DenyReason::NoMatchingRule);
        };

        if permissions.capabilities.contains(Capability::Deny) {
            return Decision::deny(DenyReason::ExplicitDeny);
        }
        if !permissions.capabilities.contains(capability) {
            return Decision::deny(DenyReason::CapabilityNotGranted);
        }

        let root_privilege = permissions.capabilities.contains(Capability::Sudo);
        if request.privileged && !root_privilege {
            return Decision::deny(DenyReason::SudoRequired);
        }

        if let Some(reason) = permissions.check_parameters(&request.data) {
            return Decision::deny(reason);
        }
        if !permissions.check_wrapping_ttl(request.wrapping_ttl) {
            return Decision::deny(DenyReason::WrappingTtlOutOfRange);
        }

        Decision::Allow {
            root_privilege,
            mfa_methods: permissions.mfa_method_names(),
            granting_policies: permissions.granting_policies(capability),
        }
    }

    /// Whether the path is reachable with root privilege: either through
    /// the literal root policy, or because the most specific matching rule
    /// carries `sudo`.
    pub fn root_privilege(&self, path: &str) -> bool {
        if self.root {
            return true;
        }
        if path.is_empty() {
            return false;
        }
        self.find_permissions(strip_leading_slash(path))
            .is_some_and(|p| p.capabilities.contains(Capability::Sudo))
    }

    /// The sorted capability names applicable to a path, for introspection
    /// APIs. `["root"]` under the root policy; `["deny"]` when no rule
    /// matches, when the match denies, or when it grants nothing.
    pub fn capabilities(&self, path: &str) -> Vec<String> {
        if self.root {
            return vec!["root".to_string()];
        }
        let denied = vec![Capability::Deny.to_string()];
        if path.is_empty() {
            return denied;
        }
        match self.find_permissions(strip_leading_slash(path)) {
            Some(permissions)
                if !permissions.capabilities.contains(Capability::Deny)
                    && !permissions.capabilities.is_empty() =>
            {
                permissions.capabilities.capability_names()
            }
            _ => denied,
        }
    }

    /// Locate the single most specific matching rule: exact match first,
    /// then the best segment-wildcard candidate against the best prefix
    /// candidate by specificity key. An equal-specificity tie prefers the
    /// segment-wildcard rule, which encodes a structural constraint the
    /// plain prefix does not.
    fn find_permissions(&self, path: &str) -> Option<&Permissions> {
        if let Some(permissions) = self.exact.get(path) {
            return Some(permissions);
        }

        let segments: Vec<&str> = path.split('/').collect();
        let segment_candidate = self
            .segment_rules
            .iter()
            .filter(|rule| rule.pattern.matches(&segments))
            .max_by(|a, b| a.pattern.cmp_specificity(&b.pattern));

        let prefix_candidate = self.longest_matching_prefix(path);

        match (segment_candidate, prefix_candidate) {
            (Some(rule), Some((prefix_len, permissions))) => {
                if prefix_len > rule.pattern.specificity() {
                    Some(permissions)
                } else {
                    Some(&rule.permissions)
                }
            }
            (Some(rule), None) => Some(&rule.permissions),
            (None, Some((_, permissions))) => Some(permissions),
            (None, None) => None,
        }
    }

    /// Longest-prefix lookup: probe ever-shorter leading slices of the
    /// path against the prefix index. O(path length) hash probes.
    fn longest_matching_prefix(&self, path: &str) -> Option<(usize, &Permissions)> {
        for end in (0..=path.len()).rev() {
            if !path.is_char_boundary(end) {
                continue;
            }
            if let Some(permissions) = self.prefixes.get(&path[..end]) {
                return Some((end, permissions));
            }
        }
        None
    }

    /// Test-facing view of a merged node's permissions, by pattern string
    /// as written in the policy (before classification).
    #[cfg(test)]
    pub(crate) fn merged_permissions(&self, pattern: &str) -> Option<&Permissions> {
        if let Some(permissions) = self.exact.get(pattern) {
            return Some(permissions);
        }
        if let Some(prefix) = pattern.strip_suffix('*') {
            if let Some(permissions) = self.prefixes.get(prefix) {
                return Some(permissions);
            }
        }
        self.segment_rules
            .iter()
            .find(|rule| rule.pattern.raw() == pattern)
            .map(|rule| &rule.permissions)
    }
}

fn strip_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

impl Acl {
    /// Convenience probe for callers with no request data or wrapping
    /// context.
    pub fn allowed(&self, operation: Operation, path: &str) -> bool {
        self.allow_operation(&AclRequest::new(operation, path))
            .is_allowed()
    }
}

fn merge_into(index: &mut HashMap<String, Permissions>, key: String, permissions: Permissions) {
    match index.entry(key) {
        Entry::Occupied(mut entry) => entry.get_mut().merge(&permissions),
        Entry::Vacant(entry) => {
            entry.insert(permissions);
        }
    }
}
