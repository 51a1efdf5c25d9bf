//! Category reference resolution
//!
//! Products carry either a normalized category reference or a legacy
//! free-text category name left over from before normalization. Resolution
//! is an explicit function returning a tagged result — callers must handle
//! every case, there is no implicit string fallback.

use serde::{Deserialize, Serialize};

/// Outcome of resolving a product's category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryRef {
    /// Normalized reference to a category record (`category:<key>`)
    Resolved { reference: String },
    /// Only a legacy free-text name is recorded
    LegacyNameOnly { name: String },
    /// No category information at all
    Unresolved,
}

impl CategoryRef {
    /// Resolve from the two persisted fields.
    ///
    /// The normalized reference always wins when both are present; a blank
    /// legacy name counts as absent.
    pub fn resolve(reference: Option<&str>, legacy_name: Option<&str>) -> Self {
        if let Some(r) = reference.filter(|r| !r.is_empty()) {
            return Self::Resolved {
                reference: r.to_string(),
            };
        }
        match legacy_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => Self::LegacyNameOnly {
                name: name.to_string(),
            },
            None => Self::Unresolved,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_wins_over_legacy_name() {
        let r = CategoryRef::resolve(Some("category:abc"), Some("Beverages"));
        assert_eq!(
            r,
            CategoryRef::Resolved {
                reference: "category:abc".into()
            }
        );
    }

    #[test]
    fn legacy_name_used_when_no_reference() {
        let r = CategoryRef::resolve(None, Some("  Beverages "));
        assert_eq!(
            r,
            CategoryRef::LegacyNameOnly {
                name: "Beverages".into()
            }
        );
    }

    #[test]
    fn blank_values_resolve_to_unresolved() {
        assert_eq!(CategoryRef::resolve(None, None), CategoryRef::Unresolved);
        assert_eq!(
            CategoryRef::resolve(Some(""), Some("   ")),
            CategoryRef::Unresolved
        );
    }
}
