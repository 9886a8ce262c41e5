//! Disk-fill forecasting
//!
//! Fits an ordinary least-squares line through a volume's used-GB history
//! and extrapolates to the volume's capacity.

use crate::domain::{DiskPrediction, TrendPoint};
use crate::error::AnalyticsError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Forecast days until the volume is full.
///
/// `capacity_gb` and `current_used_gb` come from the latest sample, not
/// from the fit. Fewer than two points or a zero time span yields an
/// infinite forecast rather than an error.
pub fn predict(
    series: &[TrendPoint],
    capacity_gb: f64,
    current_used_gb: f64,
) -> Result<DiskPrediction, AnalyticsError> {
    check_gb("capacity_gb", capacity_gb)?;
    check_gb("current_used_gb", current_used_gb)?;
    if let Some(bad) = series.iter().find(|p| !p.value.is_finite()) {
        return Err(AnalyticsError::invalid("series", bad.value));
    }

    let samples = series.len();
    let Some(slope) = slope_gb_per_day(series) else {
        return Ok(DiskPrediction::never(samples));
    };

    if slope <= 0.0 {
        return Ok(DiskPrediction {
            days_until_full: f64::INFINITY,
            gb_per_day: slope,
            samples,
        });
    }

    let remaining = (capacity_gb - current_used_gb).max(0.0);
    Ok(DiskPrediction {
        days_until_full: remaining / slope,
        gb_per_day: slope,
        samples,
    })
}

/// Least-squares slope of value against elapsed days, `None` when undefined
fn slope_gb_per_day(series: &[TrendPoint]) -> Option<f64> {
    let (first, last) = (series.first()?, series.last()?);
    if series.len() < 2 || last.at <= first.at {
        return None;
    }

    let n = series.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;

    for point in series {
        // Millisecond resolution keeps sub-second sampling from collapsing.
        let x = (point.at - first.at).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY;
        let y = point.value;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    // Relative to the magnitude of the terms; short spans give tiny but valid values.
    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator <= f64::EPSILON * n * sum_xx {
        return None;
    }

    Some((n * sum_xy - sum_x * sum_y) / denominator)
}

fn check_gb(field: &str, value: f64) -> Result<(), AnalyticsError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AnalyticsError::invalid(field, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap()
    }

    fn series(points: &[(f64, f64)]) -> Vec<TrendPoint> {
        points
            .iter()
            .map(|(days, gb)| TrendPoint::new(t0() + Duration::seconds((days * SECONDS_PER_DAY) as i64), *gb))
            .collect()
    }

    #[test]
    fn two_points_one_day_apart() {
        let prediction = predict(&series(&[(0.0, 100.0), (1.0, 110.0)]), 200.0, 110.0).unwrap();
        assert!((prediction.gb_per_day - 10.0).abs() < 1e-9);
        assert!((prediction.days_until_full - 9.0).abs() < 1e-9);
        assert_eq!(prediction.samples, 2);
    }

    #[test]
    fn flat_series_never_fills() {
        let prediction = predict(&series(&[(0.0, 50.0), (1.0, 50.0), (2.0, 50.0)]), 100.0, 50.0).unwrap();
        assert_eq!(prediction.days_until_full, f64::INFINITY);
        assert_eq!(prediction.gb_per_day, 0.0);
    }

    #[test]
    fn shrinking_usage_reports_negative_rate() {
        let prediction = predict(&series(&[(0.0, 80.0), (1.0, 70.0), (2.0, 60.0)]), 100.0, 60.0).unwrap();
        assert!(prediction.days_until_full.is_infinite());
        assert!((prediction.gb_per_day + 10.0).abs() < 1e-9);
    }

    #[test]
    fn insufficient_data_is_not_an_error() {
        assert_eq!(predict(&[], 100.0, 0.0).unwrap(), DiskPrediction::never(0));
        assert_eq!(predict(&series(&[(0.0, 1.0)]), 100.0, 1.0).unwrap(), DiskPrediction::never(1));
        let same_instant = series(&[(0.0, 1.0), (0.0, 5.0)]);
        assert_eq!(predict(&same_instant, 100.0, 5.0).unwrap(), DiskPrediction::never(2));
    }

    #[test]
    fn sub_second_span_still_fits() {
        let points = vec![
            TrendPoint::new(t0(), 10.0),
            TrendPoint::new(t0() + Duration::milliseconds(15), 10.001),
        ];
        let prediction = predict(&points, 100.0, 10.001).unwrap();
        assert!(prediction.is_filling());
        assert!((prediction.gb_per_day - 5760.0).abs() < 1.0);
        assert!(prediction.days_until_full.is_finite());
    }

    #[test]
    fn regression_smooths_a_noisy_sample() {
        // A one-off spike on day 2 would dominate a two-point slope.
        let points = series(&[(0.0, 10.0), (1.0, 11.0), (2.0, 30.0), (3.0, 13.0), (4.0, 14.0)]);
        let prediction = predict(&points, 100.0, 14.0).unwrap();
        assert!(prediction.gb_per_day > 0.0);
        assert!(prediction.gb_per_day < 5.0);
    }

    #[test]
    fn already_full_volume_predicts_zero_days() {
        let prediction = predict(&series(&[(0.0, 90.0), (1.0, 101.0)]), 100.0, 101.0).unwrap();
        assert_eq!(prediction.days_until_full, 0.0);
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let points = series(&[(0.0, 1.0), (1.0, 2.0)]);
        assert!(predict(&points, -1.0, 0.0).is_err());
        assert!(predict(&points, f64::NAN, 0.0).is_err());
        assert!(predict(&points, 10.0, f64::INFINITY).is_err());

        let mut bad = points.clone();
        bad[1].value = f64::NAN;
        assert!(matches!(
            predict(&bad, 10.0, 1.0),
            Err(AnalyticsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let points = series(&[(0.0, 3.0), (0.5, 3.7), (1.25, 4.1), (2.0, 5.2)]);
        assert_eq!(predict(&points, 50.0, 5.2).unwrap(), predict(&points, 50.0, 5.2).unwrap());
    }
}
