use astrometer::settings::EngineSettings;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Calibration file name used when the config does not name one.
pub const DEFAULT_CALIBRATION_FILE: &str = "calibration.json";

const CONFIG_PATHS: [&str; 2] = ["configs/astrometer.toml", "../../configs/astrometer.toml"];

#[derive(Debug, Clone)]
pub struct AstrometerConfig {
    /// Resolved against the directory holding the config file
    pub calibration_path: PathBuf,
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CalibrationToml {
    #[serde(default)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    calibration: CalibrationToml,
    #[serde(default)]
    engine: EngineSettings,
}

/// Try the common relative paths for `configs/astrometer.toml`.
pub fn read_config_toml_text() -> anyhow::Result<(PathBuf, String)> {
    for p in &CONFIG_PATHS {
        if let Ok(c) = fs::read_to_string(p) {
            return Ok((PathBuf::from(p), c));
        }
    }
    anyhow::bail!("Could not load astrometer.toml from {:?}", CONFIG_PATHS);
}

pub fn validate_engine_settings(engine: &EngineSettings) -> anyhow::Result<()> {
    if !(engine.gaussian_sigma_divisor.is_finite() && engine.gaussian_sigma_divisor > 0.0) {
        anyhow::bail!("engine.gaussian_sigma_divisor must be positive, got {}", engine.gaussian_sigma_divisor);
    }
    if !(engine.default_ballast.is_finite() && engine.default_ballast >= 0.0) {
        anyhow::bail!("engine.default_ballast must be non-negative, got {}", engine.default_ballast);
    }
    if !engine.trend.is_valid() {
        anyhow::bail!(
            "engine.trend thresholds must be positive and strictly increasing, got {}/{}/{}",
            engine.trend.stable,
            engine.trend.slow,
            engine.trend.moderate
        );
    }
    for (planet, value) in &engine.sensitivities {
        if !(value.is_finite() && *value > 0.0) {
            anyhow::bail!("engine.sensitivities.{} must be positive, got {value}", planet.id());
        }
    }
    if engine.top_aspect_limit == 0 {
        anyhow::bail!("engine.top_aspect_limit must be at least 1");
    }
    Ok(())
}

/// Parse config text; relative paths are resolved against `base_dir`.
pub fn parse_config(text: &str, base_dir: &Path) -> anyhow::Result<AstrometerConfig> {
    let root: RootConfigToml =
        toml::from_str(text).map_err(|e| anyhow::anyhow!("Failed to parse astrometer.toml: {e}"))?;
    validate_engine_settings(&root.engine)?;

    let path = root.calibration.path.unwrap_or_else(|| PathBuf::from(DEFAULT_CALIBRATION_FILE));
    let calibration_path = if path.is_absolute() { path } else { base_dir.join(path) };
    Ok(AstrometerConfig { calibration_path, engine: root.engine })
}

pub fn load_config_from(path: &Path) -> anyhow::Result<AstrometerConfig> {
    let text = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {e}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = parse_config(&text, base_dir)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn load_config() -> anyhow::Result<AstrometerConfig> {
    let (path, text) = read_config_toml_text()?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = parse_config(&text, base_dir)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// The calibration file must exist before any meter can be scored.
pub fn validate_calibration_path(config: &AstrometerConfig) -> anyhow::Result<&Path> {
    let path = config.calibration_path.as_path();
    if !path.exists() {
        anyhow::bail!(
            "Calibration file does not exist: {} (run `astrometer calibrate` first)",
            path.display()
        );
    }
    Ok(path)
}
