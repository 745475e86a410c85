//! Authorization request type.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::operation::Operation;
use super::param_value::ParamValue;

/// The per-request input the router hands to the ACL evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AclRequest {
    pub operation: Operation,
    pub path: String,

    /// Request data, checked against the matched rule's parameter
    /// constraints. Keys are compared case-insensitively.
    #[serde(default)]
    pub data: HashMap<String, ParamValue>,

    /// Caller-requested response-wrapping TTL, if wrapping was requested.
    #[serde(default)]
    pub wrapping_ttl: Option<Duration>,

    /// Set by the router for root-protected paths (e.g. mutating `sys/`
    /// endpoints); such requests additionally require `sudo`.
    #[serde(default)]
    pub privileged: bool,
}

impl AclRequest {
    pub fn new<P: Into<String>>(operation: Operation, path: P) -> Self {
        AclRequest {
            operation,
            path: path.into(),
            data: HashMap::new(),
            wrapping_ttl: None,
            privileged: false,
        }
    }

    /// Attach one request-data entry.
    pub fn with_data<K: Into<String>, V: Into<ParamValue>>(mut self, key: K, value: V) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_wrapping_ttl(mut self, ttl: Duration) -> Self {
        self.wrapping_ttl = Some(ttl);
        self
    }

    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = AclRequest::new(Operation::Update, "sys/seal")
            .with_data("reason", "maintenance")
            .with_wrapping_ttl(Duration::from_secs(60))
            .privileged();
        assert_eq!(request.operation, Operation::Update);
        assert_eq!(request.path, "sys/seal");
        assert_eq!(request.data["reason"], ParamValue::from("maintenance"));
        assert_eq!(request.wrapping_ttl, Some(Duration::from_secs(60)));
        assert!(request.privileged);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: AclRequest =
            serde_json::from_str(r#"{"operation": "read", "path": "secret/foo"}"#).unwrap();
        assert_eq!(request.operation, Operation::Read);
        assert!(request.data.is_empty());
        assert_eq!(request.wrapping_ttl, None);
        assert!(!request.privileged);
    }
}
