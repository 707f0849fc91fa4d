pub mod calculator;
pub mod types;

pub use calculator::{angular_separation, deviation_from, AspectCalculator, OrbSettings};
pub use types::{AspectMatch, AspectType, TransitAspect};
