pub mod types;

pub use types::{Angles, ChartData, HouseCusp, PlanetPosition};
