use sc_core::window::Label;
use sc_core::{CLASS_COUNT, FEATURE_DIM, HIDDEN_DIM};

/// Paramètres figés du réseau 4 → 6 → 3.
///
/// Les dimensions sont portées par les types : une matrice mal câblée ne
/// compile pas. Jamais muté après construction.
///
/// # Example
/// ```
/// use sc_infer::model::Model;
/// let model = Model::builtin();
/// assert_eq!(model.hidden_weights.len(), 6);
/// assert_eq!(model.labels[2].as_str(), "NOISE");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    /// W1, one row per hidden neuron.
    pub hidden_weights: [[f64; FEATURE_DIM]; HIDDEN_DIM],
    /// B1.
    pub hidden_bias: [f64; HIDDEN_DIM],
    /// W2, one row per output class.
    pub output_weights: [[f64; HIDDEN_DIM]; CLASS_COUNT],
    /// B2.
    pub output_bias: [f64; CLASS_COUNT],
    /// Class labels in output order.
    pub labels: [Label; CLASS_COUNT],
}

static BUILTIN: Model = Model {
    hidden_weights: [
        [0.15, -0.05, 0.04, 0.2],
        [-0.2, 0.3, 0.1, -0.1],
        [0.1, 0.2, -0.15, 0.25],
        [0.3, -0.2, 0.15, 0.1],
        [-0.1, 0.25, 0.3, -0.05],
        [0.2, 0.1, -0.2, 0.15],
    ],
    hidden_bias: [0.05, -0.1, 0.02, 0.05, -0.05, 0.1],
    output_weights: [
        [0.3, -0.2, 0.35, 0.1, -0.25, 0.2],  // CLAP
        [-0.1, 0.4, -0.2, 0.25, 0.2, -0.3],  // KNOCK
        [0.2, -0.1, 0.1, -0.15, 0.25, 0.3],  // NOISE
    ],
    output_bias: [0.1, -0.05, 0.05],
    labels: Label::ALL,
};

impl Model {
    /// Le modèle embarqué, partagé en lecture seule par tout le process.
    #[must_use]
    pub fn builtin() -> &'static Model {
        &BUILTIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_is_shared() {
        assert!(std::ptr::eq(Model::builtin(), Model::builtin()));
    }

    #[test]
    fn builtin_tables_are_finite() {
        let m = Model::builtin();
        let all = m
            .hidden_weights
            .iter()
            .flatten()
            .chain(m.hidden_bias.iter())
            .chain(m.output_weights.iter().flatten())
            .chain(m.output_bias.iter());
        assert_eq!(all.clone().count(), 24 + 6 + 18 + 3);
        assert!(all.copied().all(f64::is_finite));
    }

    #[test]
    fn labels_in_output_order() {
        assert_eq!(Model::builtin().labels, [Label::Clap, Label::Knock, Label::Noise]);
    }
}
