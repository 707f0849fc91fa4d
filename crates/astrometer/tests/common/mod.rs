#![allow(dead_code)]

use astrometer::ephemeris::{ChartData, PlanetPosition};
use astrometer::meters::raw_meter_scores;
use astrometer::normalization::{CalibrationBuilder, CalibrationStore};
use astrometer::settings::EngineSettings;
use astrometer::western::Planet;
use chrono::{Duration, NaiveDate};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Mean daily motion in degrees.
pub fn mean_speed(planet: Planet) -> f64 {
    match planet {
        Planet::Sun => 0.9856,
        Planet::Moon => 13.18,
        Planet::Mercury => 1.38,
        Planet::Venus => 1.2,
        Planet::Mars => 0.524,
        Planet::Jupiter => 0.083,
        Planet::Saturn => 0.033,
        Planet::Uranus => 0.0117,
        Planet::Neptune => 0.006,
        Planet::Pluto => 0.004,
    }
}

/// Equal houses counted from the ascendant.
pub fn equal_house(longitude: f64, ascendant: f64) -> u8 {
    ((longitude - ascendant).rem_euclid(360.0) / 30.0) as u8 % 12 + 1
}

pub fn chart_from(longitudes: &[(Planet, f64)], ascendant: f64, with_speed: bool) -> ChartData {
    let planets = longitudes
        .iter()
        .map(|(planet, lon)| {
            let lon = lon.rem_euclid(360.0);
            let speed = with_speed.then(|| mean_speed(*planet));
            PlanetPosition::at_longitude(*planet, lon, equal_house(lon, ascendant), speed)
        })
        .collect();
    ChartData::new(planets, Some(ascendant)).unwrap()
}

pub fn natal_chart() -> ChartData {
    chart_from(
        &[
            (Planet::Sun, 135.0),
            (Planet::Moon, 272.4),
            (Planet::Mercury, 118.9),
            (Planet::Venus, 160.2),
            (Planet::Mars, 33.7),
            (Planet::Jupiter, 248.1),
            (Planet::Saturn, 301.5),
            (Planet::Uranus, 275.0),
            (Planet::Neptune, 283.6),
            (Planet::Pluto, 225.3),
        ],
        130.0,
        false,
    )
}

pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

pub fn transit_base() -> [(Planet, f64); 10] {
    [
        (Planet::Sun, 280.6),
        (Planet::Moon, 305.0),
        (Planet::Mercury, 262.0),
        (Planet::Venus, 327.5),
        (Planet::Mars, 118.0),
        (Planet::Jupiter, 73.2),
        (Planet::Saturn, 344.8),
        (Planet::Uranus, 53.5),
        (Planet::Neptune, 357.3),
        (Planet::Pluto, 301.0),
    ]
}

/// Transit sky `days` after the epoch, moving every body at its mean speed.
pub fn transit_chart(days: i64) -> ChartData {
    let positions: Vec<(Planet, f64)> = transit_base()
        .iter()
        .map(|(planet, lon)| (*planet, lon + mean_speed(*planet) * days as f64))
        .collect();
    chart_from(&positions, 0.0, true)
}

pub fn transit_date(days: i64) -> NaiveDate {
    epoch() + Duration::days(days)
}

pub fn random_chart(rng: &mut ChaCha8Rng) -> ChartData {
    let ascendant = rng.gen_range(0.0..360.0);
    let positions: Vec<(Planet, f64)> = Planet::ALL.iter().map(|p| (*p, rng.gen_range(0.0..360.0))).collect();
    chart_from(&positions, ascendant, false)
}

/// Calibration from a year of daily transits over the fixed natal chart.
pub fn calibration(settings: &EngineSettings) -> CalibrationStore {
    calibrate_year(CalibrationBuilder::new(), settings)
}

/// Same year of samples, keeping the raw values for ranking.
pub fn calibration_with_history(settings: &EngineSettings) -> CalibrationStore {
    calibrate_year(CalibrationBuilder::new().with_history(true), settings)
}

fn calibrate_year(mut builder: CalibrationBuilder, settings: &EngineSettings) -> CalibrationStore {
    let natal = natal_chart();
    for day in 0..365 {
        let scores = raw_meter_scores(&natal, &transit_chart(day), transit_date(day), settings);
        for (meter, score) in scores {
            builder.add_score(meter.id(), &score);
        }
    }
    builder.build().unwrap()
}
