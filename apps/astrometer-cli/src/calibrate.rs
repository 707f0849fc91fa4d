use astrometer::ephemeris::ChartData;
use astrometer::meters::{calculate_all_meters, raw_meter_scores, AllMetersReading, TrendThresholds};
use astrometer::normalization::{CalibrationBuilder, CalibrationStore};
use astrometer::settings::EngineSettings;
use chrono::NaiveDate;

/// Percentile tables from every natal x transit pair, then trend cut points
/// from the day-over-day harmony deltas those tables produce.
pub fn build_calibration(
    natals: &[ChartData],
    transits: &[(NaiveDate, ChartData)],
    settings: &EngineSettings,
    keep_history: bool,
) -> anyhow::Result<CalibrationStore> {
    if natals.is_empty() || transits.is_empty() {
        anyhow::bail!("Calibration needs at least one natal chart and one dated transit chart");
    }

    let mut builder = CalibrationBuilder::new().with_history(keep_history);
    for natal in natals {
        for (date, transit) in transits {
            for (meter, score) in raw_meter_scores(natal, transit, *date, settings) {
                builder.add_score(meter.id(), &score);
            }
        }
    }
    let mut store = builder.build()?;
    log::info!("Calibrated {} meters from {} natal x {} transit charts", store.meters.len(), natals.len(), transits.len());

    let deltas = harmony_deltas(natals, transits, &store, settings)?;
    store.trend = TrendThresholds::from_deltas(&deltas);
    match &store.trend {
        Some(t) => log::info!(
            "Trend thresholds from {} deltas: {:.2}/{:.2}/{:.2}",
            deltas.len(),
            t.stable,
            t.slow,
            t.moderate
        ),
        None => log::warn!("No consecutive transit days; trend thresholds left to the engine defaults"),
    }
    Ok(store)
}

fn harmony_deltas(
    natals: &[ChartData],
    transits: &[(NaiveDate, ChartData)],
    store: &CalibrationStore,
    settings: &EngineSettings,
) -> anyhow::Result<Vec<f64>> {
    let mut deltas = Vec::new();
    for natal in natals {
        let mut previous: Option<(NaiveDate, AllMetersReading)> = None;
        for (date, transit) in transits {
            let reading = calculate_all_meters(natal, transit, *date, store, settings, None)?;
            if let Some((prev_date, prev)) = &previous {
                if date.signed_duration_since(*prev_date).num_days() == 1 {
                    for (meter, today) in &reading.meters {
                        if let Some(yesterday) = prev.meter(*meter) {
                            deltas.push(today.harmony - yesterday.harmony);
                        }
                    }
                }
            }
            previous = Some((*date, reading));
        }
    }
    Ok(deltas)
}
