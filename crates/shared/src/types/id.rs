//! Typed IDs for type-safe entity references.
//!
//! Identifiers coming from the ledger store are opaque text, so every ID wraps
//! a `String`. Using typed IDs prevents accidentally passing an `AccountId`
//! where a `TransactionId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Generates a fresh identifier from a UUID v7 (time-ordered).
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Returns the identifier text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }

            /// Returns true if the identifier is empty or whitespace only.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

typed_id!(TransactionId, "Identifier of a ledger transaction.");
typed_id!(
    TransactionLineId,
    "Identifier of one persisted transaction line row."
);
typed_id!(AccountId, "Identifier of a chart of accounts entry.");
typed_id!(OrganizationId, "Identifier of an organization.");
typed_id!(ProjectId, "Identifier of a project.");
typed_id!(CostCenterId, "Identifier of a cost center.");
typed_id!(WorkItemId, "Identifier of a construction work item.");
typed_id!(
    AnalysisWorkItemId,
    "Identifier of an analysis work item."
);
typed_id!(ClassificationId, "Identifier of a transaction classification.");
typed_id!(SubTreeId, "Identifier of an expense sub-tree node.");

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_round_trips_text() {
        let id = TransactionId::new("tx-1");
        assert_eq!(id.as_str(), "tx-1");
        assert_eq!(id.to_string(), "tx-1");
        assert_eq!(id.into_inner(), "tx-1".to_string());
    }

    #[test]
    fn test_typed_id_generate_is_unique() {
        let a = TransactionLineId::generate();
        let b = TransactionLineId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_typed_id_from_str() {
        let id = AccountId::from_str("A").unwrap();
        assert_eq!(id, AccountId::from("A"));
    }

    #[rstest]
    #[case("", true)]
    #[case("   ", true)]
    #[case("\t\n", true)]
    #[case("tx-1", false)]
    #[case(" tx ", false)]
    fn test_typed_id_blank(#[case] raw: &str, #[case] blank: bool) {
        assert_eq!(TransactionId::new(raw).is_blank(), blank);
    }
}
