//! Resolution policy and run configuration.

pub mod options;

pub use options::{CollectionInfo, ComponentSelector, ResolutionOptions, SELECT_ALL};
