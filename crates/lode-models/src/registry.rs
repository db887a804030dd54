//! Model Registry
//!
//! Central registry for the available estimators. Allows model lookup and
//! instantiation by name.

use crate::error::{ModelError, Result};
use crate::estimator::{
    Estimator, GradientBoostingRegressor, HistoricalMean, NaiveBaseline, RandomForestRegressor,
};
use std::collections::HashMap;

/// Broad model families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Rule-based references that learn little or nothing
    Baseline,
    /// Tree ensembles
    Ensemble,
}

/// Model metadata
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name (unique identifier)
    pub name: &'static str,
    /// Model family
    pub kind: ModelKind,
    /// Brief description of the forecast rule
    pub description: &'static str,
}

/// Get all available model info
pub fn available_models() -> Vec<ModelInfo> {
    vec![
        ModelInfo {
            name: "naive",
            kind: ModelKind::Baseline,
            description: "Persistence: forecast equals the current level",
        },
        ModelInfo {
            name: "historical_mean",
            kind: ModelKind::Baseline,
            description: "Mean of the training targets",
        },
        ModelInfo {
            name: "random_forest",
            kind: ModelKind::Ensemble,
            description: "Bagged regression trees with feature subsampling",
        },
        ModelInfo {
            name: "gradient_boosting",
            kind: ModelKind::Ensemble,
            description: "Squared-loss boosting of shallow regression trees",
        },
    ]
}

/// Get model info by name
pub fn get_model_info(name: &str) -> Option<ModelInfo> {
    available_models().into_iter().find(|m| m.name == name)
}

/// Get a map of all models indexed by name
pub fn model_map() -> HashMap<&'static str, ModelInfo> {
    available_models()
        .into_iter()
        .map(|m| (m.name, m))
        .collect()
}

/// List all model names
pub fn list_model_names() -> Vec<&'static str> {
    available_models().into_iter().map(|m| m.name).collect()
}

/// Instantiate a model with default settings.
pub fn build_model(name: &str) -> Result<Box<dyn Estimator>> {
    match name {
        "naive" => Ok(Box::new(NaiveBaseline::new())),
        "historical_mean" => Ok(Box::new(HistoricalMean::new())),
        "random_forest" => Ok(Box::new(RandomForestRegressor::default())),
        "gradient_boosting" => Ok(Box::new(GradientBoostingRegressor::default())),
        other => Err(ModelError::UnknownModel(other.to_string())),
    }
}

/// One fresh instance of every registered model, in registry order.
pub fn default_models() -> Vec<Box<dyn Estimator>> {
    available_models()
        .iter()
        .filter_map(|info| build_model(info.name).ok())
        .collect()
}
