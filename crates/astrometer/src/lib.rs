//! Astrometer: transit scoring against a natal chart.
//!
//! Charts go in, 23 calibrated meter readings come out. Everything here is
//! synchronous and pure apart from loading a calibration file.

pub mod aspects;
pub mod ephemeris;
pub mod error;
pub mod meters;
pub mod normalization;
pub mod scoring;
pub mod settings;
pub mod western;

pub use aspects::{AspectCalculator, AspectType, OrbSettings, TransitAspect};
pub use ephemeris::{ChartData, PlanetPosition};
pub use error::{AstrometerError, Result};
pub use meters::{
    calculate_all_meters, calculate_groups, calculate_meter, AllMetersReading, GroupReading, MeterGroup, MeterId,
    MeterReading,
};
pub use normalization::{CalibrationBuilder, CalibrationCache, CalibrationStore, NormalizationMode};
pub use scoring::AstrometerScore;
pub use settings::EngineSettings;
pub use western::{Planet, ZodiacSign};
