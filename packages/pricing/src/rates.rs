// ABOUTME: Static rate tables driving price and timeline estimation
// ABOUTME: Hand-authored bands and multipliers; injectable so tests can substitute synthetic tables

use serde::{Deserialize, Serialize};
use sitequote_core::{DeliverySpeed, DesignLevel, ProjectType};
use std::collections::HashMap;

/// Inclusive [min, max] price band in whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
}

impl PriceBand {
    pub const ZERO: PriceBand = PriceBand { min: 0.0, max: 0.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Inclusive [min, max] duration band in weeks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeksBand {
    pub min: f64,
    pub max: f64,
}

impl WeeksBand {
    pub const ZERO: WeeksBand = WeeksBand { min: 0.0, max: 0.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Multiplier per design tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierMultipliers {
    pub base: f64,
    pub custom: f64,
    pub premium: f64,
}

impl TierMultipliers {
    pub fn for_level(&self, level: DesignLevel) -> f64 {
        match level {
            DesignLevel::Base => self.base,
            DesignLevel::Custom => self.custom,
            DesignLevel::Premium => self.premium,
        }
    }
}

/// Factor per delivery speed tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedFactors {
    pub standard: f64,
    pub urgent: f64,
    pub express: f64,
}

impl SpeedFactors {
    pub fn for_speed(&self, speed: DeliverySpeed) -> f64 {
        match speed {
            DeliverySpeed::Standard => self.standard,
            DeliverySpeed::Urgent => self.urgent,
            DeliverySpeed::Express => self.express,
        }
    }
}

/// The sole source of pricing truth: bands per project type and module, a
/// flat per-page band, tier multipliers, and the duration tables.
///
/// Urgency raises price (`urgency_price`) while shortening duration
/// (`urgency_weeks`); the two factor tables are deliberately distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTable {
    pub project_type_price: HashMap<ProjectType, PriceBand>,
    pub module_price: HashMap<String, PriceBand>,
    pub page_price: PriceBand,
    pub design: TierMultipliers,
    pub urgency_price: SpeedFactors,
    pub base_weeks: HashMap<ProjectType, WeeksBand>,
    pub urgency_weeks: SpeedFactors,
    /// Weeks added per selected page, on both bounds
    pub page_weeks: f64,
    /// Weeks added per selected module, on both bounds
    pub module_weeks: f64,
}

impl RateTable {
    /// Base price band for a project type; zero if the table has no entry
    pub fn project_base(&self, project_type: ProjectType) -> PriceBand {
        self.project_type_price
            .get(&project_type)
            .copied()
            .unwrap_or(PriceBand::ZERO)
    }

    /// Price band for a module id; None for unrecognized (unpriced) modules
    pub fn module_band(&self, module_id: &str) -> Option<PriceBand> {
        self.module_price.get(module_id).copied()
    }

    /// Base duration band for a project type; zero if the table has no entry
    pub fn project_weeks(&self, project_type: ProjectType) -> WeeksBand {
        self.base_weeks
            .get(&project_type)
            .copied()
            .unwrap_or(WeeksBand::ZERO)
    }

    /// The shipped rate table. Bands are narrow so the final quote lands
    /// within roughly a ±10–15% window.
    pub fn standard() -> Self {
        let project_type_price = HashMap::from([
            (ProjectType::Landing, PriceBand::new(5_200.0, 6_200.0)),
            (ProjectType::Corporate, PriceBand::new(9_800.0, 11_800.0)),
            (ProjectType::WebApp, PriceBand::new(15_800.0, 18_800.0)),
            (ProjectType::Crm, PriceBand::new(28_000.0, 33_000.0)),
            (ProjectType::Ecommerce, PriceBand::new(14_500.0, 17_500.0)),
            (ProjectType::Blog, PriceBand::new(4_200.0, 5_200.0)),
            (ProjectType::Catalog, PriceBand::new(8_500.0, 10_500.0)),
            (ProjectType::Saas, PriceBand::new(24_000.0, 28_000.0)),
            (ProjectType::Booking, PriceBand::new(12_000.0, 14_500.0)),
        ]);

        let module_price = HashMap::from(
            [
                ("auth", PriceBand::new(1_800.0, 2_200.0)),
                ("user_dashboard", PriceBand::new(2_500.0, 3_000.0)),
                ("admin_panel", PriceBand::new(3_200.0, 3_800.0)),
                ("payments", PriceBand::new(2_800.0, 3_400.0)),
                ("forms", PriceBand::new(1_000.0, 1_250.0)),
                ("integrations", PriceBand::new(1_700.0, 2_100.0)),
                ("calculator", PriceBand::new(2_100.0, 2_600.0)),
                ("multilang", PriceBand::new(1_400.0, 1_700.0)),
                ("reviews", PriceBand::new(1_600.0, 1_950.0)),
                ("search", PriceBand::new(2_000.0, 2_400.0)),
                ("notifications", PriceBand::new(1_400.0, 1_700.0)),
                ("chat", PriceBand::new(2_400.0, 2_900.0)),
                ("booking_calendar", PriceBand::new(2_700.0, 3_200.0)),
                ("subscriptions", PriceBand::new(3_200.0, 3_800.0)),
                ("analytics", PriceBand::new(1_700.0, 2_100.0)),
                ("export", PriceBand::new(1_500.0, 1_850.0)),
            ]
            .map(|(id, band)| (id.to_string(), band)),
        );

        let base_weeks = HashMap::from([
            (ProjectType::Landing, WeeksBand::new(2.0, 3.0)),
            (ProjectType::Corporate, WeeksBand::new(4.0, 6.0)),
            (ProjectType::WebApp, WeeksBand::new(6.0, 10.0)),
            (ProjectType::Crm, WeeksBand::new(10.0, 14.0)),
            (ProjectType::Ecommerce, WeeksBand::new(6.0, 9.0)),
            (ProjectType::Blog, WeeksBand::new(2.0, 4.0)),
            (ProjectType::Catalog, WeeksBand::new(4.0, 6.0)),
            (ProjectType::Saas, WeeksBand::new(8.0, 12.0)),
            (ProjectType::Booking, WeeksBand::new(5.0, 8.0)),
        ]);

        Self {
            project_type_price,
            module_price,
            page_price: PriceBand::new(550.0, 650.0),
            design: TierMultipliers {
                base: 1.0,
                custom: 1.4,
                premium: 1.8,
            },
            urgency_price: SpeedFactors {
                standard: 1.0,
                urgent: 1.2,
                express: 1.4,
            },
            base_weeks,
            urgency_weeks: SpeedFactors {
                standard: 1.0,
                urgent: 0.8,
                express: 0.65,
            },
            page_weeks: 0.15,
            module_weeks: 0.2,
        }
    }
}
