//! Seasonal-decomposition forecaster.
//!
//! Additive decomposition of the daily series into a moving-average trend,
//! a weekday profile and a holiday uplift regressor. The trend is
//! extrapolated linearly; bounds come from the in-sample residual spread.

use crate::application::forecaster::adapters::{AdapterOutcome, ForecastAdapter};
use crate::application::forecaster::series::DailySeries;
use crate::domain::ports::HolidayCalendar;
use chrono::Datelike;

const MIN_DAYS: usize = 30;
const TREND_WINDOW: usize = 7;
/// Days of trend history used for extrapolation.
const TREND_SEGMENT: usize = 30;

pub struct SeasonalDecomposition;

impl ForecastAdapter for SeasonalDecomposition {
    fn name(&self) -> &'static str {
        "seasonal"
    }

    fn trust_weight(&self) -> f64 {
        0.40
    }

    fn forecast(
        &self,
        series: &DailySeries,
        horizon_days: usize,
        calendar: &dyn HolidayCalendar,
    ) -> AdapterOutcome {
        let n = series.len();
        if n < MIN_DAYS {
            return AdapterOutcome::skipped(format!("needs {MIN_DAYS} days, have {n}"));
        }

        let y = &series.values;

        // Centered moving-average trend, shrinking the window at the edges.
        let half = TREND_WINDOW / 2;
        let trend: Vec<f64> = (0..n)
            .map(|i| {
                let lo = i.saturating_sub(half);
                let hi = (i + half + 1).min(n);
                y[lo..hi].iter().sum::<f64>() / (hi - lo) as f64
            })
            .collect();

        // Weekday profile of the detrended series, centered on zero.
        let mut weekday_sum = [0.0f64; 7];
        let mut weekday_count = [0usize; 7];
        for i in 0..n {
            let w = series.date_at(i).weekday().num_days_from_monday() as usize;
            weekday_sum[w] += y[i] - trend[i];
            weekday_count[w] += 1;
        }
        let mut weekday_profile = [0.0f64; 7];
        for w in 0..7 {
            if weekday_count[w] > 0 {
                weekday_profile[w] = weekday_sum[w] / weekday_count[w] as f64;
            }
        }
        let profile_mean: f64 = weekday_profile.iter().sum::<f64>() / 7.0;
        for p in weekday_profile.iter_mut() {
            *p -= profile_mean;
        }

        // Holiday uplift over the seasonal baseline, when the sample has any.
        let mut holiday_sum = 0.0;
        let mut holiday_count = 0usize;
        for i in 0..n {
            let date = series.date_at(i);
            if calendar.is_holiday(date) {
                let w = date.weekday().num_days_from_monday() as usize;
                holiday_sum += y[i] - trend[i] - weekday_profile[w];
                holiday_count += 1;
            }
        }
        let holiday_uplift = if holiday_count > 0 {
            holiday_sum / holiday_count as f64
        } else {
            0.0
        };

        // Extrapolate the most recent trend segment, not the whole history:
        // the forecast should continue where the trend currently points.
        let window = TREND_SEGMENT.min(n);
        let segment = &trend[n - window..];
        let nf = window as f64;
        let mean_x = (nf - 1.0) / 2.0;
        let mean_t = segment.iter().sum::<f64>() / nf;
        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (i, &t) in segment.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxx += dx * dx;
            sxy += dx * (t - mean_t);
        }
        if sxx < 1e-12 {
            return AdapterOutcome::skipped("degenerate trend");
        }
        let slope = sxy / sxx;
        // Re-anchor the segment fit to absolute series indices.
        let intercept = mean_t - slope * (mean_x + (n - window) as f64);

        // In-sample residual spread for the interval.
        let residual_var = (0..n)
            .map(|i| {
                let w = series.date_at(i).weekday().num_days_from_monday() as usize;
                let is_holiday = calendar.is_holiday(series.date_at(i));
                let fitted = trend[i]
                    + weekday_profile[w]
                    + if is_holiday { holiday_uplift } else { 0.0 };
                (y[i] - fitted) * (y[i] - fitted)
            })
            .sum::<f64>()
            / n as f64;
        let sigma = residual_var.sqrt();

        let mut point = 0.0;
        for k in 0..horizon_days {
            let index = n + k;
            let date = series.date_at(index);
            let w = date.weekday().num_days_from_monday() as usize;
            let day = intercept
                + slope * index as f64
                + weekday_profile[w]
                + if calendar.is_holiday(date) {
                    holiday_uplift
                } else {
                    0.0
                };
            point += day.max(0.0);
        }

        let spread = 1.96 * sigma * (horizon_days as f64).sqrt();
        AdapterOutcome::Estimate {
            point,
            bounds: Some(((point - spread).max(0.0), point + spread)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct NoHolidays;
    impl HolidayCalendar for NoHolidays {
        fn is_holiday(&self, _date: NaiveDate) -> bool {
            false
        }
    }

    fn series_of(values: Vec<f64>) -> DailySeries {
        DailySeries {
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            values,
        }
    }

    #[test]
    fn test_skips_short_series() {
        let outcome =
            SeasonalDecomposition.forecast(&series_of(vec![50.0; 10]), 30, &NoHolidays);
        assert!(matches!(outcome, AdapterOutcome::Skipped { .. }));
    }

    #[test]
    fn test_flat_series_forecasts_flat_total() {
        let outcome =
            SeasonalDecomposition.forecast(&series_of(vec![100.0; 60]), 30, &NoHolidays);
        match outcome {
            AdapterOutcome::Estimate { point, bounds } => {
                assert!((point - 3000.0).abs() < 150.0, "point = {point}");
                let (lower, upper) = bounds.unwrap();
                assert!(lower <= point && point <= upper);
            }
            AdapterOutcome::Skipped { reason } => panic!("skipped: {reason}"),
        }
    }

    #[test]
    fn test_growing_series_extrapolates_growth() {
        let values: Vec<f64> = (0..60).map(|i| 50.0 + i as f64).collect();
        let outcome = SeasonalDecomposition.forecast(&series_of(values), 30, &NoHolidays);
        match outcome {
            AdapterOutcome::Estimate { point, .. } => {
                // Last 30 in-sample days sum to ~2835; the next 30 are higher.
                assert!(point > 3000.0, "point = {point}");
            }
            AdapterOutcome::Skipped { reason } => panic!("skipped: {reason}"),
        }
    }

    #[test]
    fn test_weekend_profile_carries_into_forecast() {
        // Weekends spend 200, weekdays 50, no trend.
        let values: Vec<f64> = (0..70)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Days::new(i);
                if date.weekday().num_days_from_monday() >= 5 {
                    200.0
                } else {
                    50.0
                }
            })
            .collect();
        let series = series_of(values);
        let outcome = SeasonalDecomposition.forecast(&series, 7, &NoHolidays);
        match outcome {
            AdapterOutcome::Estimate { point, .. } => {
                // One week: 5 * 50 + 2 * 200 = 650.
                assert!((point - 650.0).abs() < 100.0, "point = {point}");
            }
            AdapterOutcome::Skipped { reason } => panic!("skipped: {reason}"),
        }
    }
}
