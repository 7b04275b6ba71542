// ABOUTME: Core types and catalogs for Sitequote
// ABOUTME: Foundational package providing shared types across all Sitequote packages

pub mod catalog;
pub mod types;

// Re-export main types
pub use types::{
    AIProjectStructure, BookingType, BriefState, BudgetPreference, Complexity, ContentSource,
    DeliverySpeed, DesignLevel, DesignStyle, ExtraItem, MainBlock, PagePriority, PriceRange,
    ProjectConfig, ProjectType, TimelineWeeks,
};

// Re-export catalog helpers
pub use catalog::{
    canonical_id, is_module_id, is_page_id, CatalogItem, DEFAULT_MODULE, DEFAULT_PAGES, MODULE_IDS,
    PAGE_IDS,
};
