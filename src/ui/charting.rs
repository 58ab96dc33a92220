use typometer::time_series::TimeSeriesPoint;

/// Compute X (seconds) and Y (wpm) bounds for the results chart
pub fn compute_chart_params(points: &[TimeSeriesPoint], limit_secs: f64) -> (f64, f64) {
    let highest_wpm = points.iter().map(|p| p.wpm).fold(0.0, f64::max);

    let overall_duration = match points.last() {
        Some(p) => p.t,
        None => limit_secs,
    }
    .max(1.0);

    (overall_duration, highest_wpm.round().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
