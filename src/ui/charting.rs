use typerace::time_series::TimeSeriesPoint;

/// Compute X (word number) and Y (WPM) bounds for the results chart
pub fn compute_chart_params(points: &[TimeSeriesPoint]) -> (f64, f64) {
    let highest_wpm = points.iter().map(|p| p.wpm).fold(0.0, f64::max);
    let last_word = points.last().map(|p| p.word).unwrap_or(1.0).max(1.0);

    (last_word, highest_wpm.round())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
