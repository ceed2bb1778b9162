pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;

            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

/// Standard five-characters-per-word speed.
pub fn words_per_minute(chars: usize, secs: f64) -> f64 {
    if secs <= 0.0 {
        return 0.0;
    }
    // chars / 5 words over secs / 60 minutes
    chars as f64 * 12.0 / secs
}

/// Share of typed characters that were not mistakes, as a percentage.
pub fn accuracy_percent(typed: usize, wrong: usize) -> f64 {
    if typed == 0 {
        return 100.0;
    }
    typed.saturating_sub(wrong) as f64 * 100.0 / typed as f64
}
