use anyhow::Context;
use astrometer::ephemeris::ChartData;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn is_json(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

pub fn read_chart(path: &Path) -> anyhow::Result<ChartData> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read chart {}", path.display()))?;
    ChartData::from_json(&text).with_context(|| format!("Invalid chart {}", path.display()))
}

/// All `*.json` files under `root`, sorted by path.
pub fn json_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("Failed to scan {}", root.display()))?;
        if entry.file_type().is_file() && is_json(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Transit charts named `YYYY-MM-DD.json`, sorted by date.
pub fn dated_transits(root: &Path) -> anyhow::Result<Vec<(NaiveDate, ChartData)>> {
    let mut transits = Vec::new();
    for path in json_files(root)? {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid transit filename: {}", path.display()))?;
        let date = NaiveDate::parse_from_str(stem, "%Y-%m-%d")
            .with_context(|| format!("Transit file name must be YYYY-MM-DD.json: {}", path.display()))?;
        transits.push((date, read_chart(&path)?));
    }
    transits.sort_by_key(|(date, _)| *date);
    Ok(transits)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"{"planets": [
        {"name": "sun", "sign": "leo", "house": 10, "degree_in_sign": 15.0, "absolute_degree": 135.0}
    ]}"#;

    #[test]
    fn test_dated_transits_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2025-03-02.json"), CHART).unwrap();
        fs::write(dir.path().join("2025-03-01.json"), CHART).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let transits = dated_transits(dir.path()).unwrap();
        assert_eq!(transits.len(), 2);
        assert_eq!(transits[0].0, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_rejects_undated_transit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("today.json"), CHART).unwrap();
        assert!(dated_transits(dir.path()).is_err());
    }
}
