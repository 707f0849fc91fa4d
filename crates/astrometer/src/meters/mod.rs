pub mod definitions;
pub mod groups;
pub mod interpretation;
pub mod reading;
pub mod trend;

pub use definitions::{MeterDefinition, MeterGroup, MeterId, NatalSelector};
pub use groups::{aggregate_group, calculate_groups, GroupReading};
pub use reading::{
    attach_trends, calculate_all_meters, calculate_meter, raw_meter_scores, top_aspects, unified_score,
    AllMetersReading, MeterReading, RawScores, ScoringContext,
};
pub use trend::{calculate_trend, ChangeRate, MeterTrends, TrendData, TrendDirection, TrendThresholds};
