use sc_core::window::FeatureVector;

/// Extract the statistical descriptor of a raw window.
///
/// Returns `(mean, variance, rms, zero_crossing_rate)`. Variance is the
/// population variance of the mean-centered signal and `rms` is its square
/// root. Both are kept: the network was fitted on that redundant pair.
///
/// An empty window yields all zeros. A single sample yields a zero rate.
///
/// # Example
/// ```
/// use sc_audio::features::extract_features;
///
/// let samples: Vec<i32> = [100, -100].repeat(64);
/// let f = extract_features(&samples);
/// assert!(f.mean().abs() < 1e-12);
/// assert!((f.variance() - 10_000.0).abs() < 1e-9);
/// assert!((f.rms() - 100.0).abs() < 1e-9);
/// assert_eq!(f.zero_crossing_rate(), 127.0 / 128.0);
/// ```
#[must_use]
pub fn extract_features(samples: &[i32]) -> FeatureVector {
    if samples.is_empty() {
        return FeatureVector::default();
    }
    let n = samples.len() as f64;

    // Mean
    let mean = samples.iter().map(|&s| f64::from(s)).sum::<f64>() / n;

    // Variance of the centered signal
    let variance = samples
        .iter()
        .map(|&s| {
            let c = f64::from(s) - mean;
            c * c
        })
        .sum::<f64>()
        / n;

    let rms = variance.sqrt();

    // Sign changes between neighbours, normalized by n (not n - 1)
    let crossings = samples
        .windows(2)
        .filter(|pair| (f64::from(pair[0]) - mean) * (f64::from(pair[1]) - mean) < 0.0)
        .count();
    let zero_crossing_rate = crossings as f64 / n;

    FeatureVector::new(mean, variance, rms, zero_crossing_rate)
}
