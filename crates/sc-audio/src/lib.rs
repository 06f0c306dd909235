// Sample acquisition and feature extraction for soundclass.

#[cfg(feature = "mic")]
pub mod capture;
pub mod features;
pub mod iio;
pub mod sampler;
pub mod source;
pub mod synthetic;
