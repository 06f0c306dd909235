/// Rectified linear unit.
///
/// # Example
/// ```
/// use sc_infer::activation::relu;
/// assert_eq!(relu(-2.0), 0.0);
/// assert_eq!(relu(1.5), 1.5);
/// ```
#[inline(always)]
#[must_use]
pub fn relu(x: f64) -> f64 {
    if x > 0.0 { x } else { 0.0 }
}

/// Numerically stable softmax.
///
/// Subtracts the largest logit before exponentiating so that large scores
/// cannot overflow; the result is the same distribution as the naive form.
///
/// # Example
/// ```
/// use sc_infer::activation::softmax;
/// let p = softmax([1000.0, 1000.0]);
/// assert!((p[0] - 0.5).abs() < 1e-12);
/// ```
#[must_use]
pub fn softmax<const N: usize>(logits: [f64; N]) -> [f64; N] {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut exps = logits.map(|x| (x - max).exp());
    let sum: f64 = exps.iter().sum();
    for e in &mut exps {
        *e /= sum;
    }
    exps
}
