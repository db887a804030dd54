#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lode/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export main types from sub-crates
pub use lode_data as data;
pub use lode_features as features;
pub use lode_models as models;
pub use lode_output as output;

// Re-export the types most pipelines touch
pub use lode_data::{Mineral, Panel, YearMonth};
pub use lode_features::{FeatureConfig, FeatureSet, build_features};
pub use lode_models::{BenchmarkConfig, BenchmarkRun, Estimator, Metrics};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[rstest]
    #[case("gold", Mineral::Gold)]
    #[case("Iron ore", Mineral::IronOre)]
    fn test_reexported_minerals(#[case] name: &str, #[case] expected: Mineral) {
        assert_eq!(data::Mineral::from_name(name), Some(expected));
    }

    #[test]
    fn test_reexported_registry() {
        assert_eq!(models::available_models().len(), 4);
    }
}
