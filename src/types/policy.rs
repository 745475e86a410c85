//! Parsed policy documents: a named, ordered collection of path rules.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::param_value::ParamValue;

/// The reserved policy name granting unconditional access.
pub const ROOT_POLICY_NAME: &str = "root";

/// One governed path pattern and the permission set a policy attaches to it.
///
/// Capability tokens and the `policy` shorthand are carried verbatim as the
/// document parser produced them; the ACL builder resolves and validates
/// them when the policy set is compiled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathRule {
    /// Raw path pattern. A single leading `/` is stripped at compile time.
    pub path: String,

    /// Explicit capability token names, e.g. `["read", "sudo"]`.
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Optional `policy = "..."` shorthand, expanded on top of
    /// `capabilities`.
    #[serde(default)]
    pub policy: Option<String>,

    /// If non-empty, only the listed request-data keys are permitted. An
    /// empty value list constrains the key name only; a `"*"` key admits
    /// unlisted keys.
    #[serde(default)]
    pub allowed_parameters: HashMap<String, Vec<ParamValue>>,

    /// Request-data keys (or specific values) forbidden outright. Checked
    /// before `allowed_parameters`; a `"*"` key forbids any request data.
    #[serde(default)]
    pub denied_parameters: HashMap<String, Vec<ParamValue>>,

    /// Request-data keys that must all be present.
    #[serde(default)]
    pub required_parameters: Vec<String>,

    /// Lower bound on a caller-requested response-wrapping TTL. Zero means
    /// unset.
    #[serde(default)]
    pub min_wrapping_ttl: Duration,

    /// Upper bound on a caller-requested response-wrapping TTL. Zero means
    /// unset.
    #[serde(default)]
    pub max_wrapping_ttl: Duration,

    /// MFA methods, at least one of which the request layer must confirm
    /// before honoring an allow decision.
    #[serde(default)]
    pub mfa_methods: Vec<String>,
}

impl PathRule {
    pub fn new<P: Into<String>>(path: P) -> Self {
        PathRule {
            path: path.into(),
            ..PathRule::default()
        }
    }

    /// Set the `policy = "..."` shorthand.
    pub fn with_policy<S: Into<String>>(mut self, shorthand: S) -> Self {
        self.policy = Some(shorthand.into());
        self
    }

    /// Set the explicit capability token list.
    pub fn with_capabilities<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Add one allowed-parameter entry.
    pub fn allow_parameter<K: Into<String>>(mut self, key: K, values: Vec<ParamValue>) -> Self {
        self.allowed_parameters.insert(key.into(), values);
        self
    }

    /// Add one denied-parameter entry.
    pub fn deny_parameter<K: Into<String>>(mut self, key: K, values: Vec<ParamValue>) -> Self {
        self.denied_parameters.insert(key.into(), values);
        self
    }

    pub fn require_parameters<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_parameters = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_wrapping_ttl(mut self, ttl: Duration) -> Self {
        self.min_wrapping_ttl = ttl;
        self
    }

    pub fn with_max_wrapping_ttl(mut self, ttl: Duration) -> Self {
        self.max_wrapping_ttl = ttl;
        self
    }

    pub fn with_mfa_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mfa_methods = methods.into_iter().map(Into::into).collect();
        self
    }
}

/// A named, parsed policy document. Immutable once produced by the parser;
/// the same path string may appear in more than one rule, and every
/// occurrence is honored by the merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    #[serde(default)]
    pub paths: Vec<PathRule>,
}

impl Policy {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Policy {
            name: name.into(),
            paths: Vec::new(),
        }
    }

    pub fn with_path(mut self, rule: PathRule) -> Self {
        self.paths.push(rule);
        self
    }

    /// Whether this is the reserved root policy.
    pub fn is_root(&self) -> bool {
        self.name == ROOT_POLICY_NAME
    }
}
