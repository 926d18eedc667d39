//! Newtype wrappers for the string keys that index cluster state.
//!
//! Each key serializes as a plain string so node records stay wire-compatible
//! with clients that treat addresses and ids as opaque text.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

macro_rules! key_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

key_newtype!(
    /// Network address of an execution node. Unique within a cluster store.
    NodeAddress
);

key_newtype!(
    /// Provider-assigned identifier of a running container or VM instance.
    ContainerId
);

key_newtype!(
    /// Identifier of a provisioned box.
    BoxId
);

key_newtype!(
    /// Opaque healing-lease token handed out by the token-checked lease API.
    LeaseToken
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn address_display_and_deref() {
        let addr = NodeAddress::new("10.0.0.1");
        assert_eq!(addr.to_string(), "10.0.0.1");
        assert!(addr.starts_with("10."));
        assert_eq!(addr, "10.0.0.1");
    }

    #[test]
    fn container_id_serializes_as_plain_string() {
        let id = ContainerId::new("c-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"c-42\"");
        let back: ContainerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(NodeAddress::from("h1"), 1);
        assert_eq!(map.get("h1"), Some(&1));
    }
}
