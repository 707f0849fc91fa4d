pub mod aggregator;
pub mod background;
pub mod contribution;
pub mod quality;
pub mod transit_power;
pub mod velocity;
pub mod weightage;

pub use aggregator::{aggregate, calculate_dti_hqs, harmony_coefficient, AstrometerScore, DEFAULT_BALLAST};
pub use background::CosmicBackground;
pub use contribution::{build_contributions, AspectContribution};
pub use quality::{quality_factor, quality_factor_named};
pub use transit_power::{calculate_transit_power, calculate_transit_power_complete, orb_factor, AspectDirection};
pub use velocity::{velocity_score, SpeedTier};
pub use weightage::calculate_weightage;
