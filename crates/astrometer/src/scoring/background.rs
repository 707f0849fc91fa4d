//! Cosmic background dithering.
//!
//! A small deterministic noise term keeps unrelated charts from piling up on
//! the exact neutral value. The seed is
//! `(chart_hash + date ordinal + meter_hash) mod 10000`, drawn through a local
//! ChaCha generator, so one person, day and meter always get the same values.
//! Changing the formula shifts every calibrated score.

use chrono::{Datelike, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const SEED_MODULUS: u64 = 10_000;

pub const BACKGROUND_INTENSITY_MIN: f64 = 1.0;
pub const BACKGROUND_INTENSITY_MAX: f64 = 3.0;
pub const BACKGROUND_BIAS_LIMIT: f64 = 0.4;
pub const UNIFIED_DITHER_LIMIT: f64 = 8.0;

/// Process-independent 64-bit hash of a name.
pub fn stable_hash(text: &str) -> u64 {
    let digest = Sha256::digest(text.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Proleptic Gregorian ordinal, 0001-01-01 = 1.
pub fn date_ordinal(date: NaiveDate) -> u64 {
    date.num_days_from_ce() as u64
}

pub fn background_seed(chart_hash: u64, date: NaiveDate, meter_id: &str) -> u64 {
    chart_hash
        .wrapping_add(date_ordinal(date))
        .wrapping_add(stable_hash(meter_id))
        % SEED_MODULUS
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CosmicBackground {
    /// Added to raw intensity, in [1, 3]
    pub intensity: f64,
    /// Harmony lean of the background, in [-0.4, 0.4]
    pub bias: f64,
    /// Raw offset applied to the unified score before the sigmoid, in [-8, 8]
    pub unified_dither: f64,
}

impl CosmicBackground {
    pub fn generate(chart_hash: u64, date: NaiveDate, meter_id: &str) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(background_seed(chart_hash, date, meter_id));
        let intensity = rng.gen_range(BACKGROUND_INTENSITY_MIN..=BACKGROUND_INTENSITY_MAX);
        let bias = rng.gen_range(-BACKGROUND_BIAS_LIMIT..=BACKGROUND_BIAS_LIMIT);
        let unified_dither = rng.gen_range(-UNIFIED_DITHER_LIMIT..=UNIFIED_DITHER_LIMIT);
        Self { intensity, bias, unified_dither }
    }

    /// Contribution to the harmony numerator.
    pub fn harmony_offset(&self) -> f64 {
        self.bias * self.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_ordinal_matches_python_convention() {
        assert_eq!(date_ordinal(day(1, 1, 1)), 1);
        assert_eq!(date_ordinal(day(2000, 1, 1)), 730_120);
    }

    #[test]
    fn test_same_inputs_same_background() {
        let a = CosmicBackground::generate(42, day(2025, 3, 1), "mental_clarity");
        let b = CosmicBackground::generate(42, day(2025, 3, 1), "mental_clarity");
        assert_eq!(a, b);
    }

    #[test]
    fn test_ranges() {
        for ordinal_offset in 0..200u32 {
            let date = day(2024, 1, 1) + chrono::Duration::days(ordinal_offset as i64);
            let bg = CosmicBackground::generate(7_777, date, "overall_harmony");
            assert!((1.0..=3.0).contains(&bg.intensity));
            assert!((-0.4..=0.4).contains(&bg.bias));
            assert!((-8.0..=8.0).contains(&bg.unified_dither));
            assert!(bg.harmony_offset().abs() <= 1.2 + 1e-12);
        }
    }

    #[test]
    fn test_seed_varies_with_meter_and_date() {
        let d = day(2025, 6, 1);
        let s1 = background_seed(123, d, "mental_clarity");
        let s2 = background_seed(123, d.succ_opt().unwrap(), "mental_clarity");
        assert_eq!(s2, (s1 + 1) % SEED_MODULUS);
        assert!(s1 < SEED_MODULUS);
    }
}
