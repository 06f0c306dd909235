use sc_core::window::{ClassificationResult, FeatureVector, ProbabilityVector};
use sc_core::{CLASS_COUNT, FEATURE_DIM, HIDDEN_DIM};

use crate::activation::{relu, softmax};
use crate::model::Model;

/// Passe avant du réseau sur un modèle partagé.
///
/// Sans état : deux appels sur les mêmes features rendent exactement les
/// mêmes bits. `Copy`, donc clonable librement entre threads.
///
/// # Example
/// ```
/// use sc_infer::classifier::Classifier;
/// use sc_core::window::{FeatureVector, Label};
///
/// let clf = Classifier::builtin();
/// let result = clf.classify(&FeatureVector::default());
/// assert_eq!(result.label, Label::Clap);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Classifier<'m> {
    model: &'m Model,
}

impl<'m> Classifier<'m> {
    #[must_use]
    pub fn new(model: &'m Model) -> Self {
        Self { model }
    }

    /// The model this classifier reads.
    #[must_use]
    pub fn model(&self) -> &'m Model {
        self.model
    }

    /// Class probabilities for one feature descriptor.
    #[must_use]
    pub fn predict(&self, features: &FeatureVector) -> ProbabilityVector {
        let input = features.as_array();
        let m = self.model;

        let mut hidden = [0.0f64; HIDDEN_DIM];
        for (h, (row, &b)) in hidden
            .iter_mut()
            .zip(m.hidden_weights.iter().zip(m.hidden_bias.iter()))
        {
            *h = relu(dot(b, row, input));
        }

        let mut logits = [0.0f64; CLASS_COUNT];
        for (l, (row, &b)) in logits
            .iter_mut()
            .zip(m.output_weights.iter().zip(m.output_bias.iter()))
        {
            *l = dot(b, row, &hidden);
        }

        ProbabilityVector::new(softmax(logits))
    }

    /// `predict` on an untyped slice.
    ///
    /// # Panics
    /// Panics if `features.len() != 4`: a wrongly wired caller is a build
    /// defect, not a runtime condition.
    #[must_use]
    pub fn predict_slice(&self, features: &[f64]) -> ProbabilityVector {
        assert_eq!(
            features.len(),
            FEATURE_DIM,
            "feature vector must have {FEATURE_DIM} entries, got {}",
            features.len()
        );
        let f = FeatureVector::new(features[0], features[1], features[2], features[3]);
        self.predict(&f)
    }

    /// Predict, then pick the winning label (first maximum wins).
    #[must_use]
    pub fn classify(&self, features: &FeatureVector) -> ClassificationResult {
        self.predict(features).classify(&self.model.labels)
    }
}

impl Classifier<'static> {
    /// Classifier over the embedded model.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(Model::builtin())
    }
}

/// `bias + Σ w[j] * x[j]`, accumulated left to right.
#[inline(always)]
fn dot<const N: usize>(bias: f64, weights: &[f64; N], x: &[f64; N]) -> f64 {
    let mut acc = bias;
    for (w, v) in weights.iter().zip(x.iter()) {
        acc += w * v;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::window::Label;

    fn assert_close(actual: &[f64; 3], expected: &[f64; 3], tol: f64) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < tol, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn golden_zero_input() {
        // hidden = relu(B1) = [0.05, 0, 0.02, 0.05, 0, 0.1]
        // logits = [0.147, -0.0765, 0.0845]
        let p = Classifier::builtin().predict(&FeatureVector::default());
        assert_close(
            p.as_array(),
            &[0.365_079_695_6, 0.291_959_669_3, 0.342_960_635_0],
            1e-9,
        );
    }

    #[test]
    fn silence_is_clap() {
        let r = Classifier::builtin().classify(&FeatureVector::default());
        assert_eq!(r.label, Label::Clap);
        assert!((r.confidence - 0.365_08).abs() < 1e-5);
    }

    #[test]
    fn alternating_signal_is_knock() {
        let f = FeatureVector::new(0.0, 10_000.0, 100.0, 0.992_187_5);
        let r = Classifier::builtin().classify(&f);
        assert_eq!(r.label, Label::Knock);
        assert!((r.confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dc_level_is_clap() {
        let f = FeatureVector::new(2048.0, 0.0, 0.0, 0.0);
        let r = Classifier::builtin().classify(&f);
        assert_eq!(r.label, Label::Clap);
    }

    #[test]
    fn predictions_are_bit_reproducible() {
        let clf = Classifier::builtin();
        let f = FeatureVector::new(1234.5, 876.25, 29.6, 0.3125);
        let a = clf.predict(&f);
        let b = clf.predict(&f);
        for (x, y) in a.as_array().iter().zip(b.as_array().iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn output_is_a_distribution() {
        let clf = Classifier::builtin();
        for f in [
            FeatureVector::default(),
            FeatureVector::new(-500.0, 1.0, 1.0, 0.5),
            FeatureVector::new(65_535.0, 1e9, 31_622.0, 1.0),
        ] {
            let p = clf.predict(&f);
            assert!(p.as_array().iter().all(|&x| x >= 0.0));
            let sum: f64 = p.as_array().iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn slice_matches_typed_input() {
        let clf = Classifier::builtin();
        let f = FeatureVector::new(3.0, 4.0, 2.0, 0.25);
        assert_eq!(clf.predict_slice(f.as_array()), clf.predict(&f));
    }

    #[test]
    #[should_panic(expected = "feature vector must have 4 entries")]
    fn wrong_length_is_a_contract_violation() {
        let _ = Classifier::builtin().predict_slice(&[0.0, 0.0, 0.0]);
    }

    #[test]
    fn custom_model_is_honoured() {
        let mut model = Model::builtin().clone();
        model.output_bias = [0.0, 0.0, 100.0];
        let r = Classifier::new(&model).classify(&FeatureVector::default());
        assert_eq!(r.label, Label::Noise);
    }
}
