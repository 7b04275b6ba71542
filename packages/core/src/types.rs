// ABOUTME: Type definitions for project estimation
// ABOUTME: Defines project classification enums, user config, AI structure, and brief data

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level classification of the site/service being built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Landing,
    Corporate,
    WebApp,
    Crm,
    Ecommerce,
    Blog,
    Catalog,
    Saas,
    Booking,
}

impl ProjectType {
    /// All valid project types, in rate-table order
    pub const ALL: [ProjectType; 9] = [
        ProjectType::Landing,
        ProjectType::Corporate,
        ProjectType::WebApp,
        ProjectType::Crm,
        ProjectType::Ecommerce,
        ProjectType::Blog,
        ProjectType::Catalog,
        ProjectType::Saas,
        ProjectType::Booking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Landing => "landing",
            ProjectType::Corporate => "corporate",
            ProjectType::WebApp => "web_app",
            ProjectType::Crm => "crm",
            ProjectType::Ecommerce => "ecommerce",
            ProjectType::Blog => "blog",
            ProjectType::Catalog => "catalog",
            ProjectType::Saas => "saas",
            ProjectType::Booking => "booking",
        }
    }

    /// Parse a raw identifier; unknown values yield None (callers default)
    pub fn parse(raw: &str) -> Option<ProjectType> {
        Self::ALL.iter().copied().find(|t| t.as_str() == raw)
    }
}

impl Default for ProjectType {
    fn default() -> Self {
        ProjectType::Landing
    }
}

/// Visual design investment tier, multiplies both price and duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignLevel {
    Base,
    Custom,
    Premium,
}

impl DesignLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesignLevel::Base => "base",
            DesignLevel::Custom => "custom",
            DesignLevel::Premium => "premium",
        }
    }
}

impl Default for DesignLevel {
    fn default() -> Self {
        DesignLevel::Base
    }
}

/// Delivery urgency tier: raises price, shortens duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverySpeed {
    Standard,
    Urgent,
    Express,
}

impl DeliverySpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliverySpeed::Standard => "standard",
            DeliverySpeed::Urgent => "urgent",
            DeliverySpeed::Express => "express",
        }
    }
}

impl Default for DeliverySpeed {
    fn default() -> Self {
        DeliverySpeed::Standard
    }
}

/// AI-assessed project complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn parse(raw: &str) -> Option<Complexity> {
        match raw {
            "low" => Some(Complexity::Low),
            "medium" => Some(Complexity::Medium),
            "high" => Some(Complexity::High),
            _ => None,
        }
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Complexity::Medium
    }
}

/// User-controlled project configuration, input to the price calculator.
///
/// `pages` and `modules` are treated as sets: order and duplicates do not
/// affect pricing. Page ids may be freeform; module ids outside the catalog
/// carry no price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project_type: ProjectType,
    pub pages: Vec<String>,
    pub modules: Vec<String>,
    pub design_level: DesignLevel,
    pub timeline: DeliverySpeed,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project_type: ProjectType::Landing,
            pages: Vec::new(),
            modules: Vec::new(),
            design_level: DesignLevel::Base,
            timeline: DeliverySpeed::Standard,
        }
    }
}

/// Normalized AI analysis result: recommended structure for a project.
///
/// Every id in `modules` and `recommended_pages` should have an `explanation`
/// entry; the gap-filling pass attempts to guarantee it but callers must
/// tolerate absent entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AIProjectStructure {
    pub project_type: ProjectType,
    pub modules: Vec<String>,
    pub recommended_pages: Vec<String>,
    /// Page id → short display name
    #[serde(default)]
    pub page_labels: HashMap<String, String>,
    /// Module id → short display name
    #[serde(default)]
    pub module_labels: HashMap<String, String>,
    pub complexity: Complexity,
    /// Page or module id → one-sentence rationale
    #[serde(default)]
    pub explanation: HashMap<String, String>,
}

/// Estimated price window in whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: i64,
    pub max: i64,
}

/// Estimated delivery window in weeks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineWeeks {
    pub min_weeks: u32,
    pub max_weeks: u32,
}

/// A freeform page or module added outside the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraItem {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub explanation: String,
}

/// Who supplies the site content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Client,
    Studio,
    Mixed,
}

/// Client budget stance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPreference {
    Flexible,
    NoLimit,
    UpTo,
}

/// Relative importance of a page within the brief
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagePriority {
    Primary,
    Secondary,
}

/// Visual direction chosen in the brief
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignStyle {
    Minimalism,
    Corporate,
    Bright,
    Creative,
    Shop,
    Premium,
}

/// What kind of resource a booking project reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Services,
    Tables,
    Rooms,
}

/// A named block on the main page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainBlock {
    pub id: String,
    pub label: String,
}

/// Extended brief collected across the wizard steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefState {
    pub target_audience: String,
    pub reference_urls: Vec<String>,
    pub content_source: ContentSource,
    pub budget_preference: BudgetPreference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_up_to: Option<i64>,
    pub page_priorities: HashMap<String, PagePriority>,
    pub main_page_blocks: Vec<String>,
    /// User-added main page blocks
    #[serde(default)]
    pub custom_main_blocks: Vec<MainBlock>,
    pub design_style: DesignStyle,
    /// UX/interactivity options: simple_nav, animations, interactive, mobile
    #[serde(default)]
    pub ux_options: Vec<String>,
    pub payment_methods: Vec<String>,
    pub booking_type: BookingType,
    pub integrations: Vec<String>,
    pub notification_channels: Vec<String>,
    #[serde(default)]
    pub comment: String,
}

impl Default for BriefState {
    fn default() -> Self {
        Self {
            target_audience: String::new(),
            reference_urls: Vec::new(),
            content_source: ContentSource::Client,
            budget_preference: BudgetPreference::Flexible,
            budget_up_to: None,
            page_priorities: HashMap::new(),
            main_page_blocks: Vec::new(),
            custom_main_blocks: Vec::new(),
            design_style: DesignStyle::Minimalism,
            ux_options: Vec::new(),
            payment_methods: Vec::new(),
            booking_type: BookingType::Services,
            integrations: Vec::new(),
            notification_channels: vec!["email".to_string()],
            comment: String::new(),
        }
    }
}
