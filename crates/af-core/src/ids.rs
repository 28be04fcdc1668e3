//! ID type wrappers for type safety.
//!
//! Backend identifiers arrive either as JSON numbers or strings; they are kept
//! as strings so that both shapes compare equal once normalised.

use serde::{Deserialize, Serialize};

macro_rules! impl_id {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                pub fn new(id: impl Into<String>) -> Self {
                    Self(id.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }

                pub fn into_inner(self) -> String {
                    self.0
                }

                /// Blank ids and the backend's `0` placeholder mean "no id".
                pub fn is_unset(&self) -> bool {
                    let trimmed = self.0.trim();
                    trimmed.is_empty() || trimmed == "0"
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<String> for $name {
                fn from(s: String) -> Self {
                    Self(s)
                }
            }

            impl From<&str> for $name {
                fn from(s: &str) -> Self {
                    Self(s.to_string())
                }
            }

            impl From<u64> for $name {
                fn from(n: u64) -> Self {
                    Self(n.to_string())
                }
            }

            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }
        )*
    };
}

/// Auction lot identifier (`item_id` in the backend API).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

/// Auction (event) identifier an item belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuctionId(String);

/// Authenticated user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl_id!(ItemId, AuctionId, UserId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_compare_equal() {
        assert_eq!(ItemId::from(42u64), ItemId::from("42"));
    }

    #[test]
    fn zero_and_blank_ids_are_unset() {
        assert!(UserId::from("0").is_unset());
        assert!(UserId::from("  ").is_unset());
        assert!(!UserId::from("17").is_unset());
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&ItemId::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
