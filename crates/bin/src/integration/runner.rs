//! Benchmark jobs over a loaded panel.

use super::pipeline::PipelineError;
use indicatif::ProgressBar;
use lode_data::{Mineral, Panel};
use lode_features::{FeatureConfig, build_features};
use lode_models::{
    BenchmarkConfig, BenchmarkRun, Estimator, ModelError, benchmark_feature_set, build_model,
    default_models,
};
use tracing::warn;

/// What to benchmark.
#[derive(Debug, Clone)]
pub(crate) struct BenchmarkPlan {
    /// Minerals to forecast.
    pub minerals: Vec<Mineral>,
    /// Horizons in months.
    pub horizons: Vec<usize>,
    /// Model names (all registered models when empty).
    pub models: Vec<String>,
    /// Feature construction settings.
    pub features: FeatureConfig,
    /// Train/test split settings.
    pub benchmark: BenchmarkConfig,
    /// Fail instead of skipping minerals without usable data.
    pub strict: bool,
}

impl BenchmarkPlan {
    /// Number of (mineral, horizon) jobs.
    pub(crate) fn job_count(&self) -> usize {
        self.minerals.len() * self.horizons.len()
    }

    fn instantiate_models(&self) -> Result<Vec<Box<dyn Estimator>>, ModelError> {
        if self.models.is_empty() {
            return Ok(default_models());
        }
        self.models.iter().map(|name| build_model(name)).collect()
    }
}

/// Run every (mineral, horizon) job, in mineral-major order.
///
/// Non-strict plans skip minerals absent from the panel and jobs with too
/// little history, logging a warning for each.
pub(crate) fn run_plan(
    panel: &Panel,
    plan: &BenchmarkPlan,
    progress: Option<&ProgressBar>,
) -> Result<Vec<BenchmarkRun>, PipelineError> {
    // Unknown model names fail before any work is done
    plan.instantiate_models()?;

    let mut runs = Vec::with_capacity(plan.job_count());
    for &mineral in &plan.minerals {
        let present = panel.has_column(&mineral.production_column());
        if !present && !plan.strict {
            warn!(%mineral, "No production series in panel; skipping");
            if let Some(pb) = progress {
                pb.inc(plan.horizons.len() as u64);
            }
            continue;
        }

        for &horizon in &plan.horizons {
            if let Some(pb) = progress {
                pb.set_message(format!("{mineral} h={horizon}"));
            }

            let features = build_features(panel, mineral, horizon, &plan.features)?;
            let mut models = plan.instantiate_models()?;
            match benchmark_feature_set(&mut models, &features, &plan.benchmark) {
                Ok(run) => runs.push(run),
                Err(ModelError::InsufficientData { train, test }) if !plan.strict => {
                    warn!(%mineral, horizon, train, test, "Too little history; skipping");
                }
                Err(e) => return Err(e.into()),
            }

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }
    }

    Ok(runs)
}
