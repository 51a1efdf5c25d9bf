//! Audit log vocabulary
//!
//! Actions and entity kinds are closed enums; the audit trail never stores
//! free-form markers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Audited action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Product created in the catalog
    CreateProduct,
    /// Product updated in the catalog
    UpdateProduct,
    /// Product removed from the catalog
    DeleteProduct,
    /// Sale line committed
    CreateSale,
    /// Inventory increased by a restock
    Restock,
    /// Operator profile changed
    UpdateProfile,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateProduct => "CREATE_PRODUCT",
            Self::UpdateProduct => "UPDATE_PRODUCT",
            Self::DeleteProduct => "DELETE_PRODUCT",
            Self::CreateSale => "CREATE_SALE",
            Self::Restock => "RESTOCK",
            Self::UpdateProfile => "UPDATE_PROFILE",
        };
        f.write_str(s)
    }
}

/// Kind of entity an audit entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Sale,
    Profile,
    Inventory,
}

impl EntityKind {
    /// Parse the snake_case path-segment form used by the audit query API.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "product" => Some(Self::Product),
            "sale" => Some(Self::Sale),
            "profile" => Some(Self::Profile),
            "inventory" => Some(Self::Inventory),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Product => "product",
            Self::Sale => "sale",
            Self::Profile => "profile",
            Self::Inventory => "inventory",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_parses_its_display_form() {
        for kind in [
            EntityKind::Product,
            EntityKind::Sale,
            EntityKind::Profile,
            EntityKind::Inventory,
        ] {
            assert_eq!(EntityKind::parse(&kind.to_string()), Some(kind));
        }
        assert_eq!(EntityKind::parse("order"), None);
    }
}
