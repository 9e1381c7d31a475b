//! Struct `Sample` represents a batch sample,
//! `SurvivalSample` a batch of right-censored survival data.

// Provides feature struct.
pub(crate) mod feature;
// Provides sample struct.
pub(crate) mod sample_struct;
// Provides survival sample struct.
pub(crate) mod survival_sample;


pub use sample_struct::Sample;
pub use feature::Feature;
pub use survival_sample::SurvivalSample;
