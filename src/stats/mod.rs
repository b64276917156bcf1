//! Statistics over per-seed samples

pub mod bimodality;
pub mod gmm;
pub mod kde;
pub mod summary;

pub use bimodality::{split_at_threshold, AttractorSplit};
pub use gmm::{select_components, GaussianMixture, GmmOptions, ModelSelection};
pub use kde::{linspace, GaussianKde};
pub use summary::{mean, percentile, population_std, sample_std, Summary};
