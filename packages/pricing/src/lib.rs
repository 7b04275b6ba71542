// ABOUTME: Sitequote pricing library - price and timeline estimation
// ABOUTME: Pure table-driven calculator over a user-selected project configuration

pub mod calculator;
pub mod rates;

pub use calculator::{
    calculate_price, calculate_timeline, price_breakdown, timeline_stages, PriceLine,
    TimelineStage,
};
pub use rates::{PriceBand, RateTable, SpeedFactors, TierMultipliers, WeeksBand};
