// ABOUTME: Pure price and timeline calculators over a rate table
// ABOUTME: Missing table keys contribute zero; these functions never fail

use serde::{Deserialize, Serialize};
use sitequote_core::{DesignLevel, PriceRange, ProjectConfig, TimelineWeeks};
use std::collections::HashSet;
use tracing::debug;

use crate::rates::RateTable;

/// One line of the human-auditable price decomposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLine {
    pub label: String,
    pub min: i64,
    pub max: i64,
}

/// One named phase of the delivery plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineStage {
    pub name: String,
    pub min_weeks: u32,
    pub max_weeks: u32,
}

/// First-occurrence dedup; pages and modules are sets for costing purposes
fn dedup(ids: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn combined_multiplier(table: &RateTable, config: &ProjectConfig) -> f64 {
    table.design.for_level(config.design_level) * table.urgency_price.for_speed(config.timeline)
}

/// Unrounded [min, max] subtotal before the design/urgency multiplier
fn subtotal(table: &RateTable, config: &ProjectConfig) -> (f64, f64) {
    let base = table.project_base(config.project_type);
    let mut min = base.min;
    let mut max = base.max;

    for module_id in dedup(&config.modules) {
        match table.module_band(module_id) {
            Some(band) => {
                min += band.min;
                max += band.max;
            }
            None => {
                debug!(module = module_id, "module has no rate entry, unpriced");
            }
        }
    }

    // Every page costs the flat band, freeform extras included
    let page_count = dedup(&config.pages).len() as f64;
    min += page_count * table.page_price.min;
    max += page_count * table.page_price.max;

    (min, max)
}

/// Estimate the price window for a configuration.
///
/// Deterministic and total: unknown module ids contribute nothing, and each
/// bound is rounded independently.
pub fn calculate_price(table: &RateTable, config: &ProjectConfig) -> PriceRange {
    let (min, max) = subtotal(table, config);
    let mult = combined_multiplier(table, config);
    PriceRange {
        min: (min * mult).round() as i64,
        max: (max * mult).round() as i64,
    }
}

/// Estimate the delivery window in weeks.
///
/// Pages and modules lengthen the schedule whether or not they are priced,
/// urgency shortens it, and the result is floored to at least 1–2 weeks so
/// trivial configurations never produce a degenerate range.
pub fn calculate_timeline(table: &RateTable, config: &ProjectConfig) -> TimelineWeeks {
    let base = table.project_weeks(config.project_type);
    let page_count = dedup(&config.pages).len() as f64;
    let module_count = dedup(&config.modules).len() as f64;

    let extra = page_count * table.page_weeks + module_count * table.module_weeks;
    let factor =
        table.design.for_level(config.design_level) * table.urgency_weeks.for_speed(config.timeline);

    let min = ((base.min + extra) * factor).round().max(1.0);
    let max = ((base.max + extra) * factor).round().max(2.0);
    TimelineWeeks {
        min_weeks: min as u32,
        max_weeks: max as u32,
    }
}

/// Decompose the price into auditable lines: base, modules, pages, and the
/// combined multiplier expressed as the delta it adds.
///
/// Each line rounds independently, so the lines sum to [`calculate_price`]
/// only within ±1 unit per bound. Display aid, not an accounting identity.
pub fn price_breakdown(table: &RateTable, config: &ProjectConfig) -> Vec<PriceLine> {
    let base = table.project_base(config.project_type);
    let mut lines = vec![PriceLine {
        label: "Project type base".to_string(),
        min: base.min.round() as i64,
        max: base.max.round() as i64,
    }];

    let modules = dedup(&config.modules);
    if !modules.is_empty() {
        let (mut mod_min, mut mod_max) = (0.0, 0.0);
        for module_id in &modules {
            if let Some(band) = table.module_band(module_id) {
                mod_min += band.min;
                mod_max += band.max;
            }
        }
        lines.push(PriceLine {
            label: "Modules".to_string(),
            min: mod_min.round() as i64,
            max: mod_max.round() as i64,
        });
    }

    let pages = dedup(&config.pages);
    if !pages.is_empty() {
        let count = pages.len() as f64;
        lines.push(PriceLine {
            label: "Pages".to_string(),
            min: (count * table.page_price.min).round() as i64,
            max: (count * table.page_price.max).round() as i64,
        });
    }

    let (sub_min, sub_max) = subtotal(table, config);
    let mult = combined_multiplier(table, config);
    lines.push(PriceLine {
        label: format!("Design × urgency factor (×{:.2})", mult),
        min: (sub_min * mult).round() as i64 - sub_min.round() as i64,
        max: (sub_max * mult).round() as i64 - sub_max.round() as i64,
    });

    lines
}

/// Split the averaged total into four fixed phases. Display aid only; it is
/// derived from the same total as [`calculate_timeline`] but does not
/// reconcile with its bounds exactly.
pub fn timeline_stages(table: &RateTable, config: &ProjectConfig) -> Vec<TimelineStage> {
    let TimelineWeeks {
        min_weeks,
        max_weeks,
    } = calculate_timeline(table, config);
    let total = (min_weeks + max_weeks) as f64 / 2.0;

    let analysis = 1.0;
    let design_share = match config.design_level {
        DesignLevel::Base => 0.20,
        DesignLevel::Custom => 0.35,
        DesignLevel::Premium => 0.40,
    };
    let build_share = 1.0 - analysis / total - design_share;

    let design_weeks = (total * design_share).round().max(1.0) as u32;
    let build_weeks = (total * build_share).round().max(1.0) as u32;

    vec![
        TimelineStage {
            name: "Analysis & scope".to_string(),
            min_weeks: 1,
            max_weeks: 1,
        },
        TimelineStage {
            name: "Design".to_string(),
            min_weeks: design_weeks,
            max_weeks: design_weeks + 1,
        },
        TimelineStage {
            name: "Build".to_string(),
            min_weeks: build_weeks,
            max_weeks: build_weeks + 1,
        },
        TimelineStage {
            name: "Testing".to_string(),
            min_weeks: 1,
            max_weeks: 1,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::{PriceBand, SpeedFactors, TierMultipliers, WeeksBand};
    use pretty_assertions::assert_eq;
    use sitequote_core::{DeliverySpeed, ProjectType, MODULE_IDS};
    use std::collections::HashMap;

    fn config(project_type: ProjectType) -> ProjectConfig {
        ProjectConfig {
            project_type,
            ..ProjectConfig::default()
        }
    }

    /// Tiny synthetic table to check the arithmetic independent of real rates
    fn synthetic_table() -> RateTable {
        RateTable {
            project_type_price: HashMap::from([(
                ProjectType::Landing,
                PriceBand::new(100.0, 200.0),
            )]),
            module_price: HashMap::from([("auth".to_string(), PriceBand::new(10.0, 20.0))]),
            page_price: PriceBand::new(1.0, 2.0),
            design: TierMultipliers {
                base: 1.0,
                custom: 2.0,
                premium: 3.0,
            },
            urgency_price: SpeedFactors {
                standard: 1.0,
                urgent: 2.0,
                express: 4.0,
            },
            base_weeks: HashMap::from([(ProjectType::Landing, WeeksBand::new(2.0, 3.0))]),
            urgency_weeks: SpeedFactors {
                standard: 1.0,
                urgent: 0.5,
                express: 0.25,
            },
            page_weeks: 1.0,
            module_weeks: 1.0,
        }
    }

    #[test]
    fn test_synthetic_arithmetic() {
        let table = synthetic_table();
        let cfg = ProjectConfig {
            project_type: ProjectType::Landing,
            pages: vec!["home".to_string(), "faq".to_string()],
            modules: vec!["auth".to_string()],
            design_level: DesignLevel::Custom,
            timeline: DeliverySpeed::Urgent,
        };
        // (100 + 10 + 2*1) * 2 * 2 = 448; (200 + 20 + 2*2) * 4 = 896
        let price = calculate_price(&table, &cfg);
        assert_eq!(price, PriceRange { min: 448, max: 896 });
    }

    #[test]
    fn test_min_never_exceeds_max_on_shipped_table() {
        let table = RateTable::standard();
        let adversarial: Vec<ProjectConfig> = vec![
            config(ProjectType::Landing),
            ProjectConfig {
                project_type: ProjectType::Crm,
                pages: vec![],
                modules: MODULE_IDS.iter().map(|m| m.to_string()).collect(),
                design_level: DesignLevel::Premium,
                timeline: DeliverySpeed::Express,
            },
            ProjectConfig {
                project_type: ProjectType::Blog,
                pages: vec!["home".to_string(), "home".to_string()],
                modules: vec![],
                design_level: DesignLevel::Base,
                timeline: DeliverySpeed::Standard,
            },
        ];
        for cfg in &adversarial {
            let price = calculate_price(&table, cfg);
            assert!(
                price.min <= price.max,
                "inverted range for {:?}: {:?}",
                cfg,
                price
            );
            assert!(price.min >= 0, "negative price for {:?}", cfg);
        }
    }

    #[test]
    fn test_price_invariant_under_reorder_and_duplicates() {
        let table = RateTable::standard();
        let ordered = ProjectConfig {
            project_type: ProjectType::Ecommerce,
            pages: vec!["home".to_string(), "cart".to_string(), "catalog".to_string()],
            modules: vec!["auth".to_string(), "payments".to_string()],
            design_level: DesignLevel::Custom,
            timeline: DeliverySpeed::Standard,
        };
        let shuffled = ProjectConfig {
            pages: vec![
                "catalog".to_string(),
                "home".to_string(),
                "cart".to_string(),
                "home".to_string(),
            ],
            modules: vec![
                "payments".to_string(),
                "auth".to_string(),
                "payments".to_string(),
            ],
            ..ordered.clone()
        };
        assert_eq!(
            calculate_price(&table, &ordered),
            calculate_price(&table, &shuffled),
            "order and duplicates must not change the price"
        );
    }

    #[test]
    fn test_duplicate_pages_price_as_one() {
        let table = RateTable::standard();
        let single = ProjectConfig {
            pages: vec!["home".to_string()],
            ..config(ProjectType::Landing)
        };
        let duplicated = ProjectConfig {
            pages: vec!["home".to_string(), "home".to_string()],
            ..config(ProjectType::Landing)
        };
        assert_eq!(
            calculate_price(&table, &single),
            calculate_price(&table, &duplicated)
        );
    }

    #[test]
    fn test_unknown_module_contributes_zero() {
        let table = RateTable::standard();
        let with_unknown = ProjectConfig {
            modules: vec!["totally_unknown".to_string()],
            ..config(ProjectType::Corporate)
        };
        let without = config(ProjectType::Corporate);
        assert_eq!(
            calculate_price(&table, &with_unknown),
            calculate_price(&table, &without),
            "unpriced modules must cost exactly zero"
        );
    }

    #[test]
    fn test_freeform_pages_still_cost_the_flat_rate() {
        let table = RateTable::standard();
        let catalogued = ProjectConfig {
            pages: vec!["home".to_string()],
            ..config(ProjectType::Landing)
        };
        let freeform = ProjectConfig {
            pages: vec!["privacy_policy".to_string()],
            ..config(ProjectType::Landing)
        };
        assert_eq!(
            calculate_price(&table, &catalogued),
            calculate_price(&table, &freeform),
            "pages price the same whether catalogued or freeform"
        );
    }

    #[test]
    fn test_timeline_floors() {
        let table = RateTable::standard();
        for t in ProjectType::ALL {
            for speed in [
                DeliverySpeed::Standard,
                DeliverySpeed::Urgent,
                DeliverySpeed::Express,
            ] {
                let cfg = ProjectConfig {
                    project_type: t,
                    timeline: speed,
                    ..ProjectConfig::default()
                };
                let weeks = calculate_timeline(&table, &cfg);
                assert!(weeks.min_weeks >= 1, "{:?}/{:?} min below floor", t, speed);
                assert!(weeks.max_weeks >= 2, "{:?}/{:?} max below floor", t, speed);
            }
        }
    }

    #[test]
    fn test_express_shortens_while_raising_price() {
        let table = RateTable::standard();
        let standard = config(ProjectType::Saas);
        let express = ProjectConfig {
            timeline: DeliverySpeed::Express,
            ..standard.clone()
        };
        let std_price = calculate_price(&table, &standard);
        let exp_price = calculate_price(&table, &express);
        let std_weeks = calculate_timeline(&table, &standard);
        let exp_weeks = calculate_timeline(&table, &express);
        assert!(exp_price.min > std_price.min, "express must cost more");
        assert!(
            exp_weeks.max_weeks < std_weeks.max_weeks,
            "express must deliver sooner"
        );
    }

    #[test]
    fn test_breakdown_sums_to_total_within_one_unit() {
        let table = RateTable::standard();
        let cfg = ProjectConfig {
            project_type: ProjectType::Ecommerce,
            pages: vec![
                "home".to_string(),
                "catalog".to_string(),
                "product".to_string(),
                "cart".to_string(),
                "checkout".to_string(),
            ],
            modules: vec![
                "auth".to_string(),
                "payments".to_string(),
                "search".to_string(),
            ],
            design_level: DesignLevel::Custom,
            timeline: DeliverySpeed::Urgent,
        };
        let lines = price_breakdown(&table, &cfg);
        let total = calculate_price(&table, &cfg);
        let line_min: i64 = lines.iter().map(|l| l.min).sum();
        let line_max: i64 = lines.iter().map(|l| l.max).sum();
        assert!(
            (line_min - total.min).abs() <= 1,
            "min lines {} vs total {}",
            line_min,
            total.min
        );
        assert!(
            (line_max - total.max).abs() <= 1,
            "max lines {} vs total {}",
            line_max,
            total.max
        );
    }

    #[test]
    fn test_breakdown_omits_empty_groups() {
        let table = RateTable::standard();
        let lines = price_breakdown(&table, &config(ProjectType::Landing));
        assert_eq!(lines.len(), 2, "only base and multiplier lines expected");
        assert_eq!(lines[0].label, "Project type base");
        assert!(lines[1].label.starts_with("Design × urgency factor"));
    }

    #[test]
    fn test_multiplier_line_is_zero_at_base_standard() {
        let table = RateTable::standard();
        let lines = price_breakdown(&table, &config(ProjectType::Corporate));
        let mult_line = lines.last().unwrap();
        assert_eq!(mult_line.min, 0);
        assert_eq!(mult_line.max, 0);
    }

    #[test]
    fn test_stages_shape() {
        let table = RateTable::standard();
        let cfg = ProjectConfig {
            project_type: ProjectType::WebApp,
            pages: vec!["home".to_string(), "account".to_string()],
            modules: vec!["auth".to_string()],
            design_level: DesignLevel::Premium,
            timeline: DeliverySpeed::Standard,
        };
        let stages = timeline_stages(&table, &cfg);
        assert_eq!(stages.len(), 4);
        assert_eq!(stages[0].name, "Analysis & scope");
        assert_eq!(stages[0].min_weeks, 1);
        assert_eq!(stages[0].max_weeks, 1);
        assert_eq!(stages[3].name, "Testing");
        assert_eq!(stages[3].min_weeks, 1);
        for stage in &stages[1..3] {
            assert!(stage.min_weeks >= 1, "{} below one week", stage.name);
            assert_eq!(
                stage.max_weeks,
                stage.min_weeks + 1,
                "{} max must be min+1",
                stage.name
            );
        }
    }

    #[test]
    fn test_stages_never_degenerate_on_trivial_config() {
        let table = RateTable::standard();
        let cfg = ProjectConfig {
            timeline: DeliverySpeed::Express,
            ..config(ProjectType::Landing)
        };
        for stage in timeline_stages(&table, &cfg) {
            assert!(stage.min_weeks >= 1, "{} collapsed to zero", stage.name);
        }
    }

    #[test]
    fn test_missing_table_entries_degrade_to_zero() {
        // Synthetic table knows only Landing; other types must not panic
        let table = synthetic_table();
        let cfg = config(ProjectType::Crm);
        let price = calculate_price(&table, &cfg);
        assert_eq!(price, PriceRange { min: 0, max: 0 });
        let weeks = calculate_timeline(&table, &cfg);
        assert_eq!(weeks.min_weeks, 1, "floor still applies");
        assert_eq!(weeks.max_weeks, 2, "floor still applies");
    }
}
