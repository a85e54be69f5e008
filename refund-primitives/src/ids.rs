//! Identifier types for refunds and the parties acting on them.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

const MAX_ID_LEN: usize = 64;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier after validating its format.
            ///
            /// # Errors
            ///
            /// Returns [`Error::InvalidId`] if the identifier is blank, too long,
            /// or contains whitespace or control characters.
            pub fn new(id: impl Into<String>) -> Result<Self> {
                let id = id.into();
                validate_identifier($kind, &id)?;
                Ok(Self(id))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

string_id!(
    /// Identifier of a refund request, e.g. `R101`.
    RefundId,
    "refund id"
);

string_id!(
    /// Identifier of the order a refund is raised against, e.g. `#9281`.
    OrderId,
    "order id"
);

string_id!(
    /// Identifier of whoever acts on a refund: the reviewer resolving it or the
    /// requester withdrawing it.
    ActorId,
    "actor id"
);

impl RefundId {
    /// Generates a fresh, random refund identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("R-{}", Uuid::new_v4().simple()))
    }
}

fn validate_identifier(kind: &'static str, id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidId {
            kind,
            id: id.into(),
            reason: "identifier cannot be empty".into(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(Error::InvalidId {
            kind,
            id: id.into(),
            reason: format!("identifier length must be <= {MAX_ID_LEN}"),
        });
    }

    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::InvalidId {
            kind,
            id: id.into(),
            reason: "identifier cannot contain whitespace or control characters".into(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_source_style_identifiers() {
        assert_eq!(RefundId::new("R101").unwrap().as_str(), "R101");
        assert_eq!(OrderId::new("#9281").unwrap().to_string(), "#9281");
        assert!("simran.manager".parse::<ActorId>().is_ok());
    }

    #[test]
    fn rejects_blank_and_spaced_identifiers() {
        let err = RefundId::new("  ").unwrap_err();
        assert!(matches!(err, Error::InvalidId { kind: "refund id", .. }));
        assert!(OrderId::new("92 81").is_err());
        assert!(ActorId::new("x".repeat(MAX_ID_LEN + 1)).is_err());
    }

    #[test]
    fn generated_ids_are_unique_and_valid() {
        let a = RefundId::generate();
        let b = RefundId::generate();
        assert_ne!(a, b);
        assert!(RefundId::new(a.as_str()).is_ok());
    }

    #[test]
    fn deserialization_validates() {
        let parsed: RefundId = serde_json::from_str("\"R102\"").unwrap();
        assert_eq!(parsed.as_str(), "R102");
        assert!(serde_json::from_str::<RefundId>("\"\"").is_err());
    }
}
