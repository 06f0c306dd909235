// Fixed-weight feed-forward network for soundclass.

pub mod activation;
pub mod classifier;
pub mod model;

pub use classifier::Classifier;
pub use model::Model;
