//! Percentile-table normalization onto a 0-100 scale.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Percentile breakpoints written by the calibration builder.
pub const STANDARD_PERCENTILES: [u8; 9] = [1, 5, 10, 25, 50, 75, 90, 95, 99];

/// Monotonic (percentile, raw value) breakpoints, sorted by percentile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct PercentileTable {
    points: Vec<(f64, f64)>,
}

fn parse_percentile_key(key: &str) -> Result<f64, String> {
    let digits = key
        .strip_prefix('p')
        .ok_or_else(|| format!("percentile key '{key}' must look like p01..p99"))?;
    let pct: f64 = digits
        .parse()
        .map_err(|_| format!("percentile key '{key}' is not numeric"))?;
    if !(0.0..=100.0).contains(&pct) {
        return Err(format!("percentile key '{key}' out of range"));
    }
    Ok(pct)
}

fn percentile_key(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("p{:02}", pct as u32)
    } else {
        format!("p{pct}")
    }
}

impl TryFrom<BTreeMap<String, f64>> for PercentileTable {
    type Error = String;

    fn try_from(map: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        let mut points = Vec::with_capacity(map.len());
        for (key, value) in map {
            points.push((parse_percentile_key(&key)?, value));
        }
        PercentileTable::new(points)
    }
}

impl From<PercentileTable> for BTreeMap<String, f64> {
    fn from(table: PercentileTable) -> Self {
        table.points.into_iter().map(|(p, v)| (percentile_key(p), v)).collect()
    }
}

impl PercentileTable {
    pub fn new(mut points: Vec<(f64, f64)>) -> Result<Self, String> {
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        if points.len() < 2 {
            return Err("need at least two percentile breakpoints".to_string());
        }
        if points.iter().any(|(_, v)| !v.is_finite()) {
            return Err("percentile values must be finite".to_string());
        }
        for pair in points.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(format!("duplicate percentile p{}", pair[0].0));
            }
            if pair[1].1 < pair[0].1 {
                return Err(format!(
                    "breakpoints not monotonic: p{} = {} > p{} = {}",
                    pair[0].0, pair[0].1, pair[1].0, pair[1].1
                ));
            }
        }
        if points[0].1 >= points[points.len() - 1].1 {
            return Err("percentile range is empty".to_string());
        }
        Ok(Self { points })
    }

    /// Build from `"pNN"` keys.
    pub fn from_keys<'a, I>(entries: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut points = Vec::new();
        for (key, value) in entries {
            points.push((parse_percentile_key(key)?, value));
        }
        Self::new(points)
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn min(&self) -> (f64, f64) {
        self.points[0]
    }

    pub fn max(&self) -> (f64, f64) {
        self.points[self.points.len() - 1]
    }

    /// Raw value at a percentile, interpolated between breakpoints.
    pub fn value_at(&self, pct: f64) -> f64 {
        let (min_pct, min_val) = self.min();
        let (max_pct, max_val) = self.max();
        if pct <= min_pct {
            return min_val;
        }
        if pct >= max_pct {
            return max_val;
        }
        for pair in self.points.windows(2) {
            let (p0, v0) = pair[0];
            let (p1, v1) = pair[1];
            if pct <= p1 {
                return v0 + (pct - p0) / (p1 - p0) * (v1 - v0);
            }
        }
        max_val
    }

    /// Percentile position of a raw value, clamped to the table's range.
    pub fn percentile_of(&self, value: f64) -> f64 {
        let (min_pct, min_val) = self.min();
        let (max_pct, max_val) = self.max();
        if value <= min_val {
            return min_pct;
        }
        if value >= max_val {
            return max_pct;
        }
        for pair in self.points.windows(2) {
            let (p0, v0) = pair[0];
            let (p1, v1) = pair[1];
            if value == v1 {
                return p1;
            }
            if value < v1 {
                if v1 == v0 {
                    return p0;
                }
                return p0 + (value - v0) / (v1 - v0) * (p1 - p0);
            }
        }
        max_pct
    }

    /// Lowest and highest percentile whose breakpoint equals `value`. Without
    /// such a breakpoint both ends are the interpolated position.
    pub fn percentile_span(&self, value: f64) -> (f64, f64) {
        let mut hits = self.points.iter().filter(|(_, v)| *v == value).map(|(p, _)| *p);
        match hits.next() {
            Some(lo) => (lo, hits.last().unwrap_or(lo)),
            None => {
                let pct = self.percentile_of(value);
                (pct, pct)
            }
        }
    }

    /// True when zero lies strictly inside the table's range.
    pub fn straddles_zero(&self) -> bool {
        self.min().1 < 0.0 && self.max().1 > 0.0
    }
}

/// Map a raw value onto 0-100 by percentile interpolation.
///
/// The lowest breakpoint maps to 0 and the highest to 100, so with the usual
/// p01..p99 table only the outer 2% of the raw distribution is clamped.
pub fn interpolate_percentile(value: f64, table: &PercentileTable) -> f64 {
    scale_percentile(table.percentile_of(value), table)
}

fn scale_percentile(pct: f64, table: &PercentileTable) -> f64 {
    let (min_pct, _) = table.min();
    let (max_pct, _) = table.max();
    ((pct - min_pct) / (max_pct - min_pct) * 100.0).clamp(0.0, 100.0)
}

/// Harmony normalization anchored so that a raw 0 lands on exactly 50.
///
/// Each side of zero is stretched separately, so an asymmetric table still
/// keeps the neutral fixed point. When several breakpoints sit at exactly 0,
/// negative values are anchored on the lowest of them and positive values on
/// the highest, so the score moves away from 50 continuously in both
/// directions. Tables that do not straddle zero fall back to plain
/// interpolation.
pub fn normalize_harmony(value: f64, table: &PercentileTable) -> f64 {
    if !table.straddles_zero() {
        return interpolate_percentile(value, table);
    }
    if value == 0.0 {
        return 50.0;
    }
    let (lo, hi) = table.percentile_span(0.0);
    let zero_lo = scale_percentile(lo, table);
    let zero_hi = scale_percentile(hi, table);
    let scaled = interpolate_percentile(value, table);
    let score = if value > 0.0 {
        50.0 + 50.0 * (scaled - zero_hi) / (100.0 - zero_hi)
    } else {
        50.0 * scaled / zero_lo
    };
    score.clamp(0.0, 100.0)
}

/// Logistic squashing centred on the median, reaching 25/75 at the quartiles.
pub fn sigmoid_normalize(value: f64, center: f64, table: &PercentileTable) -> f64 {
    let q1 = table.value_at(25.0);
    let q3 = table.value_at(75.0);
    let mut spread = (q3 - q1) / 2.0;
    if spread <= 0.0 {
        spread = (table.max().1 - table.min().1) / 4.0;
    }
    // logistic(ln 3) = 0.75
    let k = 3f64.ln() / spread;
    (100.0 / (1.0 + (-(value - center) * k).exp())).clamp(0.0, 100.0)
}

/// Percent of historical values at or below `value`.
pub fn percentile_rank(value: f64, history: &[f64]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let at_or_below = history.iter().filter(|h| **h <= value).count();
    Some(at_or_below as f64 / history.len() as f64 * 100.0)
}

/// Linear-interpolated quantile (q in [0, 1]) of an unsorted sample.
pub fn quantile(samples: &[f64], q: f64) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_table() -> PercentileTable {
        PercentileTable::from_keys([("p01", 100.0), ("p50", 500.0), ("p99", 1000.0)]).unwrap()
    }

    #[test]
    fn test_reference_interpolation() {
        let table = reference_table();
        assert_eq!(interpolate_percentile(500.0, &table), 50.0);
        assert_eq!(interpolate_percentile(1200.0, &table), 100.0);
        assert_eq!(interpolate_percentile(0.0, &table), 0.0);
        assert_eq!(interpolate_percentile(100.0, &table), 0.0);
        assert_eq!(interpolate_percentile(1000.0, &table), 100.0);
    }

    #[test]
    fn test_interpolation_between_breakpoints() {
        let table = reference_table();
        let v = interpolate_percentile(300.0, &table);
        assert!(v > 0.0 && v < 50.0);
        assert!((v - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_monotonic_table() {
        assert!(PercentileTable::from_keys([("p01", 10.0), ("p50", 5.0), ("p99", 20.0)]).is_err());
        assert!(PercentileTable::from_keys([("p01", 10.0)]).is_err());
        assert!(PercentileTable::from_keys([("x01", 10.0), ("p99", 20.0)]).is_err());
    }

    #[test]
    fn test_harmony_zero_is_neutral_even_when_asymmetric() {
        let table = PercentileTable::from_keys([("p01", -0.2), ("p50", 0.1), ("p99", 0.9)]).unwrap();
        assert_eq!(normalize_harmony(0.0, &table), 50.0);
        assert!(normalize_harmony(0.05, &table) > 50.0);
        assert!(normalize_harmony(-0.05, &table) < 50.0);
        assert_eq!(normalize_harmony(0.9, &table), 100.0);
        assert_eq!(normalize_harmony(-0.2, &table), 0.0);
    }

    #[test]
    fn test_harmony_symmetric_table_is_identity_on_percentiles() {
        let table = PercentileTable::from_keys([("p01", -0.8), ("p50", 0.0), ("p99", 0.8)]).unwrap();
        assert_eq!(normalize_harmony(0.0, &table), 50.0);
        let up = normalize_harmony(0.4, &table);
        let down = normalize_harmony(-0.4, &table);
        assert!((up + down - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_harmony_run_of_zero_breakpoints() {
        let table =
            PercentileTable::from_keys([("p01", -0.6), ("p25", 0.0), ("p50", 0.0), ("p75", 0.0), ("p99", 0.6)])
                .unwrap();
        assert_eq!(table.percentile_span(0.0), (25.0, 75.0));
        assert_eq!(normalize_harmony(0.0, &table), 50.0);

        let up = normalize_harmony(1e-6, &table);
        let down = normalize_harmony(-1e-6, &table);
        assert!(up > 50.0 && up - 50.0 < 1e-3, "tiny positive jumped to {up}");
        assert!(down < 50.0 && 50.0 - down < 1e-3, "tiny negative jumped to {down}");

        assert!((normalize_harmony(0.3, &table) - 75.0).abs() < 1e-9);
        assert!((normalize_harmony(-0.3, &table) - 25.0).abs() < 1e-9);
        assert_eq!(normalize_harmony(0.6, &table), 100.0);
        assert_eq!(normalize_harmony(-0.6, &table), 0.0);
    }

    #[test]
    fn test_sigmoid_mode() {
        let table = PercentileTable::from_keys([("p01", 0.0), ("p25", 10.0), ("p50", 20.0), ("p75", 30.0), ("p99", 60.0)])
            .unwrap();
        assert!((sigmoid_normalize(20.0, 20.0, &table) - 50.0).abs() < 1e-9);
        assert!((sigmoid_normalize(30.0, 20.0, &table) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_rank_and_quantile() {
        let history = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile_rank(2.0, &history), Some(50.0));
        assert_eq!(percentile_rank(0.5, &history), Some(0.0));
        assert_eq!(percentile_rank(1.0, &[]), None);
        assert_eq!(quantile(&[3.0, 1.0, 2.0], 0.5), Some(2.0));
        assert_eq!(quantile(&[0.0, 10.0], 0.25), Some(2.5));
    }

    #[test]
    fn test_serde_roundtrip_keys() {
        let json = r#"{"p01": 1.0, "p50": 5.0, "p99": 9.0}"#;
        let table: PercentileTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.points().len(), 3);
        let back = serde_json::to_value(&table).unwrap();
        assert_eq!(back["p01"], 1.0);
    }
}
