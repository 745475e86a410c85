//! Operation capabilities and their bitmap representation.

use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// One permitted action kind, or the special `deny` marker.
///
/// `deny` is absolute: once set on a merged path rule it voids every other
/// bit. `sudo` grants access to root-protected paths on top of whichever
/// CRUD capabilities the rule carries.
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
    EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Deny,
    Create,
    Read,
    Update,
    Delete,
    List,
    Patch,
    Recover,
    Sudo,
}

impl Capability {
    /// The bit this capability occupies in a `CapabilitiesBitmap`.
    pub const fn bit(self) -> u32 {
        match self {
            Capability::Deny => 1 << 0,
            Capability::Create => 1 << 1,
            Capability::Read => 1 << 2,
            Capability::Update => 1 << 3,
            Capability::Delete => 1 << 4,
            Capability::List => 1 << 5,
            Capability::Patch => 1 << 6,
            Capability::Recover => 1 << 7,
            Capability::Sudo => 1 << 8,
        }
    }
}

/// A fixed-width set of capabilities, one bit per `Capability`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct CapabilitiesBitmap(u32);

impl CapabilitiesBitmap {
    /// A bitmap with only the `deny` bit set. Used to stamp a merged rule
    /// once any contributing policy denies the path.
    pub const fn deny_only() -> Self {
        CapabilitiesBitmap(Capability::Deny.bit())
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub const fn union(self, other: CapabilitiesBitmap) -> Self {
        CapabilitiesBitmap(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The names of every capability set in this bitmap, sorted
    /// alphabetically for stable output.
    pub fn capability_names(self) -> Vec<String> {
        Capability::iter()
            .filter(|c| self.contains(*c))
            .map(|c| c.to_string())
            .sorted()
            .collect()
    }
}

impl Display for CapabilitiesBitmap {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}]", self.capability_names().join(", "))
    }
}

impl FromIterator<Capability> for CapabilitiesBitmap {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut bitmap = CapabilitiesBitmap::default();
        for capability in iter {
            bitmap.insert(capability);
        }
        bitmap
    }
}

/// The `policy = "..."` shorthand a path rule may carry instead of an
/// explicit capability list.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PolicyShorthand {
    Deny,
    Read,
    Write,
    Sudo,
}

impl PolicyShorthand {
    /// The capability set the shorthand expands to.
    pub fn capabilities(self) -> CapabilitiesBitmap {
        use Capability::*;
        match self {
            PolicyShorthand::Deny => [Deny].into_iter().collect(),
            PolicyShorthand::Read => [Read, List].into_iter().collect(),
            PolicyShorthand::Write => [Create, Read, Update, Delete, List].into_iter().collect(),
            PolicyShorthand::Sudo => [Create, Read, Update, Delete, List, Sudo]
                .into_iter()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use yare::parameterized;

    use super::*;

    #[parameterized(
        deny = { "deny", Capability::Deny },
        create = { "create", Capability::Create },
        read = { "read", Capability::Read },
        update = { "update", Capability::Update },
        delete = { "delete", Capability::Delete },
        list = { "list", Capability::List },
        patch = { "patch", Capability::Patch },
        recover = { "recover", Capability::Recover },
        sudo = { "sudo", Capability::Sudo },
    )]
    fn test_capability_from_str(token: &str, expected: Capability) {
        assert_eq!(Capability::from_str(token).unwrap(), expected);
        assert_eq!(expected.to_string(), token);
    }

    #[parameterized(
        unknown_token = { "frobnicate" },
        capitalized = { "Read" },
        empty = { "" },
    )]
    fn test_capability_from_str_rejects_unknown(token: &str) {
        assert!(Capability::from_str(token).is_err());
    }

    #[parameterized(
        deny = { PolicyShorthand::Deny, &["deny"] },
        read = { PolicyShorthand::Read, &["list", "read"] },
        write = { PolicyShorthand::Write, &["create", "delete", "list", "read", "update"] },
        sudo = { PolicyShorthand::Sudo, &["create", "delete", "list", "read", "sudo", "update"] },
    )]
    fn test_shorthand_expansion(shorthand: PolicyShorthand, expected: &[&str]) {
        assert_eq!(shorthand.capabilities().capability_names(), expected);
    }

    #[test]
    fn test_bitmap_insert_and_contains() {
        let mut bitmap = CapabilitiesBitmap::default();
        assert!(bitmap.is_empty());
        bitmap.insert(Capability::Read);
        bitmap.insert(Capability::Sudo);
        assert!(bitmap.contains(Capability::Read));
        assert!(bitmap.contains(Capability::Sudo));
        assert!(!bitmap.contains(Capability::Delete));
    }

    #[test]
    fn test_bitmap_union() {
        let read: CapabilitiesBitmap = [Capability::Read].into_iter().collect();
        let write = PolicyShorthand::Write.capabilities();
        let merged = read.union(write);
        assert_eq!(
            merged.capability_names(),
            ["create", "delete", "list", "read", "update"]
        );
    }

    #[test]
    fn test_capability_names_sorted() {
        let bitmap: CapabilitiesBitmap = [Capability::Sudo, Capability::Create, Capability::Patch]
            .into_iter()
            .collect();
        assert_eq!(bitmap.capability_names(), ["create", "patch", "sudo"]);
    }

    #[test]
    fn test_bitmap_serialization_is_transparent() {
        let bitmap = CapabilitiesBitmap::deny_only();
        let serialized = serde_json::to_value(bitmap).unwrap();
        assert_eq!(serialized, serde_json::json!(1));
        let deserialized: CapabilitiesBitmap = serde_json::from_value(serialized).unwrap();
        assert_eq!(bitmap, deserialized);
    }
}
