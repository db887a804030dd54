#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lode/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod error;
pub mod feature_set;
pub mod matrix;

pub use builder::{FeatureConfig, LEVEL_FEATURE, build_features};
pub use error::{FeatureError, Result};
pub use feature_set::{FeatureSet, TARGET_COLUMN};
pub use matrix::FeatureMatrix;
