//! Small statistics helpers shared by the detectors and the classifier.

/// Arithmetic mean. Returns 0.0 for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. Returns 0.0 for fewer than two values.
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.max(0.0).sqrt()
}

/// Coefficient of variation (stddev / mean).
///
/// Returns `None` when the mean is not positive, where the ratio is
/// meaningless.
#[must_use]
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values);
    if m <= 0.0 {
        return None;
    }
    Some(std_dev(values) / m)
}

/// Shannon entropy (bits) of the amounts binned to the nearest integer
/// currency unit. Returns 0.0 for an empty slice.
#[must_use]
pub fn binned_entropy_bits(amounts: &[f64]) -> f64 {
    if amounts.is_empty() {
        return 0.0;
    }
    let mut counts: hashbrown::HashMap<i64, usize> = hashbrown::HashMap::new();
    for &a in amounts {
        *counts.entry(a.round() as i64).or_insert(0) += 1;
    }
    let n = amounts.len() as f64;
    counts
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}
