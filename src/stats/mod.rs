//! Statistics over table columns
//!
//! - [`summary`]: five-number summaries and categorical level tables
//! - [`density`]: histogram binning and Gaussian kernel density estimates

pub mod density;
pub mod summary;

pub use density::{gaussian_kde, histogram};
pub use summary::{summarize_categorical, summarize_numerical, CategoricalSummary, NumericalSummary};
