use std::fmt;

use crate::{CLASS_COUNT, FEATURE_DIM};

/// Une fenêtre d'échantillons bruts capturée en un cycle.
///
/// Immuable une fois capturée. Les valeurs sont brutes, dans la plage du
/// périphérique (ex. 0–4095 ou 0–65535).
///
/// # Example
/// ```
/// use sc_core::window::RawWindow;
/// let w = RawWindow::new(vec![1, 2, 3]);
/// assert_eq!(w.len(), 3);
/// assert_eq!(w.samples(), &[1, 2, 3]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawWindow {
    samples: Vec<i32>,
}

impl RawWindow {
    /// Wrap captured samples.
    #[must_use]
    pub fn new(samples: Vec<i32>) -> Self {
        Self { samples }
    }

    /// Samples in capture order.
    #[must_use]
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Number of samples in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Descripteur statistique d'une fenêtre : `(mean, variance, rms, zcr)`.
///
/// L'ordre est fixe, c'est l'ordre d'entrée du réseau.
///
/// # Example
/// ```
/// use sc_core::window::FeatureVector;
/// let f = FeatureVector::new(0.0, 4.0, 2.0, 0.5);
/// assert_eq!(f.as_array(), &[0.0, 4.0, 2.0, 0.5]);
/// assert_eq!(f.rms(), 2.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FeatureVector([f64; FEATURE_DIM]);

impl FeatureVector {
    /// Build a descriptor from its four components.
    #[must_use]
    pub const fn new(mean: f64, variance: f64, rms: f64, zero_crossing_rate: f64) -> Self {
        Self([mean, variance, rms, zero_crossing_rate])
    }

    /// Arithmetic mean of the raw samples.
    #[inline]
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.0[0]
    }

    /// Population variance of the centered samples.
    #[inline]
    #[must_use]
    pub fn variance(&self) -> f64 {
        self.0[1]
    }

    /// Square root of the variance.
    #[inline]
    #[must_use]
    pub fn rms(&self) -> f64 {
        self.0[2]
    }

    /// Fraction of adjacent centered pairs with opposite sign.
    #[inline]
    #[must_use]
    pub fn zero_crossing_rate(&self) -> f64 {
        self.0[3]
    }

    /// Network input view.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> &[f64; FEATURE_DIM] {
        &self.0
    }
}

/// Étiquettes de sortie, dans l'ordre des neurones de sortie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    Clap,
    Knock,
    Noise,
}

impl Label {
    /// All labels in output-neuron order.
    pub const ALL: [Label; CLASS_COUNT] = [Label::Clap, Label::Knock, Label::Noise];

    /// Label for an output index, `None` past the last class.
    ///
    /// # Example
    /// ```
    /// use sc_core::window::Label;
    /// assert_eq!(Label::from_index(1), Some(Label::Knock));
    /// assert_eq!(Label::from_index(3), None);
    /// ```
    #[must_use]
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Clap => "CLAP",
            Label::Knock => "KNOCK",
            Label::Noise => "NOISE",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distribution de probabilités sur les classes.
///
/// Entrées ≥ 0, somme ≈ 1.
///
/// # Example
/// ```
/// use sc_core::window::ProbabilityVector;
/// let p = ProbabilityVector::new([0.5, 0.5, 0.0]);
/// assert_eq!(p.argmax(), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbabilityVector([f64; CLASS_COUNT]);

impl ProbabilityVector {
    #[must_use]
    pub const fn new(probs: [f64; CLASS_COUNT]) -> Self {
        Self(probs)
    }

    #[must_use]
    pub fn as_array(&self) -> &[f64; CLASS_COUNT] {
        &self.0
    }

    /// Index of the largest probability. Ties go to the lowest index.
    #[must_use]
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.0.iter().enumerate().skip(1) {
            if p > self.0[best] {
                best = i;
            }
        }
        best
    }

    /// Winning label and its probability.
    ///
    /// `labels` is the model's label table, in output order.
    #[must_use]
    pub fn classify(&self, labels: &[Label; CLASS_COUNT]) -> ClassificationResult {
        let idx = self.argmax();
        ClassificationResult {
            label: labels[idx],
            confidence: self.0[idx],
            probabilities: *self,
        }
    }
}

/// Résultat d'un cycle : étiquette gagnante et confiance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassificationResult {
    /// Winning label.
    pub label: Label,
    /// Probability of the winning label.
    pub confidence: f64,
    /// Full distribution the label was picked from.
    pub probabilities: ProbabilityVector,
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prediction: {} Confidence: {:.3}", self.label, self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_first_maximum_wins() {
        let p = ProbabilityVector::new([0.5, 0.5, 0.0]);
        assert_eq!(p.argmax(), 0);
        let r = p.classify(&Label::ALL);
        assert_eq!(r.label, Label::Clap);
        assert!((r.confidence - 0.5).abs() < f64::EPSILON);

        let p = ProbabilityVector::new([0.2, 0.4, 0.4]);
        assert_eq!(p.argmax(), 1);
    }

    #[test]
    fn confidence_is_the_max() {
        let p = ProbabilityVector::new([0.1, 0.3, 0.6]);
        let r = p.classify(&Label::ALL);
        assert_eq!(r.label, Label::Noise);
        let max = p.as_array().iter().copied().fold(f64::MIN, f64::max);
        assert!((r.confidence - max).abs() < f64::EPSILON);
    }

    #[test]
    fn display_rounds_to_three_decimals() {
        let r = ProbabilityVector::new([0.365_079_7, 0.291_96, 0.342_96]).classify(&Label::ALL);
        assert_eq!(r.to_string(), "Prediction: CLAP Confidence: 0.365");
    }

    #[test]
    fn labels_keep_output_order() {
        for (i, label) in Label::ALL.iter().enumerate() {
            assert_eq!(Label::from_index(i), Some(*label));
        }
        assert_eq!(Label::from_index(CLASS_COUNT), None);
        assert_eq!(Label::from_index(usize::MAX), None);
        assert_eq!(Label::Knock.to_string(), "KNOCK");
    }
}
