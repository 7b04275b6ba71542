// ABOUTME: Closed catalogs of page and module identifiers
// ABOUTME: Whitelist membership, id canonicalization, and the catalogued/freeform split

use serde::{Deserialize, Serialize};

/// The 18 page ids recognized by the estimator.
///
/// Pages are open-world: ids outside this list are still accepted as freeform
/// extras and priced at the flat per-page rate.
pub const PAGE_IDS: &[&str] = &[
    "home",
    "services",
    "cases",
    "contacts",
    "about",
    "catalog",
    "cart",
    "faq",
    "pricing",
    "team",
    "portfolio",
    "blog",
    "product",
    "checkout",
    "account",
    "booking_form",
    "reviews",
    "contacts_map",
];

/// The 16 module ids recognized by the estimator.
///
/// Modules are closed-world: only these ids carry a price, and unrecognized
/// module suggestions are coerced to [`DEFAULT_MODULE`].
pub const MODULE_IDS: &[&str] = &[
    "auth",
    "user_dashboard",
    "admin_panel",
    "payments",
    "forms",
    "integrations",
    "calculator",
    "multilang",
    "reviews",
    "search",
    "notifications",
    "chat",
    "booking_calendar",
    "subscriptions",
    "analytics",
    "export",
];

/// Fallback module injected when a landing project resolves with no modules
pub const DEFAULT_MODULE: &str = "forms";

/// Fallback pages used when the AI recommends none
pub const DEFAULT_PAGES: &[&str] = &["home", "contacts"];

pub fn is_page_id(id: &str) -> bool {
    PAGE_IDS.contains(&id)
}

pub fn is_module_id(id: &str) -> bool {
    MODULE_IDS.contains(&id)
}

/// Canonical token form for an id: trimmed, lowercased, internal whitespace
/// runs collapsed to a single underscore.
pub fn canonical_id(raw: &str) -> String {
    raw.trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// A page or module reference, explicit about whether it comes from the
/// fixed catalog or was invented for this project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogItem {
    /// An id from the fixed whitelist
    Catalogued { id: String },
    /// An ad hoc id outside the whitelist; carries its own display data
    Freeform {
        id: String,
        label: String,
        explanation: String,
    },
}

impl CatalogItem {
    pub fn id(&self) -> &str {
        match self {
            CatalogItem::Catalogued { id } => id,
            CatalogItem::Freeform { id, .. } => id,
        }
    }

    pub fn is_catalogued(&self) -> bool {
        matches!(self, CatalogItem::Catalogued { .. })
    }
}
