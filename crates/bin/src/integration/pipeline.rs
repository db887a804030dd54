//! Source loading: data directory to assembled panel.

use lode_data::{
    DataError, MacroSource, Panel, ProductionLayout, Sheet, load_prices, load_production,
};
use lode_features::FeatureError;
use lode_models::ModelError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default production workbook inside the data directory.
pub(crate) const PRODUCTION_FILE: &str = "production_sales.xlsx";

/// Default price workbook inside the data directory.
pub(crate) const PRICES_FILE: &str = "prices.xls";

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PipelineError {
    /// Input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),
    /// Loading or assembly failed.
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    /// Feature construction failed.
    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),
    /// Fitting or scoring failed.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Files feeding one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DataSources {
    /// Production-volume workbook.
    pub production: PathBuf,
    /// Price workbook.
    pub prices: PathBuf,
    /// Macro series, each becoming one panel column.
    pub macros: Vec<MacroSource>,
}

impl DataSources {
    /// Resolve the default file names inside `data_dir`, unless overridden.
    pub(crate) fn from_data_dir(
        data_dir: &Path,
        production: Option<PathBuf>,
        prices: Option<PathBuf>,
        macros: Vec<MacroSource>,
    ) -> Self {
        Self {
            production: production.unwrap_or_else(|| data_dir.join(PRODUCTION_FILE)),
            prices: prices.unwrap_or_else(|| data_dir.join(PRICES_FILE)),
            macros,
        }
    }

    /// Panel column names of the macro series.
    pub(crate) fn macro_names(&self) -> Vec<String> {
        self.macros.iter().map(|m| m.name.clone()).collect()
    }

    fn check_inputs(&self) -> Result<(), PipelineError> {
        let paths = [&self.production, &self.prices]
            .into_iter()
            .chain(self.macros.iter().map(|m| &m.path));
        for path in paths {
            if !path.is_file() {
                return Err(PipelineError::MissingInput(path.clone()));
            }
        }
        Ok(())
    }
}

/// Load every source and assemble the monthly panel.
pub(crate) fn load_panel(
    sources: &DataSources,
    layout: &ProductionLayout,
) -> Result<Panel, PipelineError> {
    sources.check_inputs()?;

    let production = load_production(&Sheet::open(&sources.production, None)?, layout)?;
    info!(
        path = %sources.production.display(),
        months = production.height(),
        series = production.width() - 1,
        "Loaded production"
    );

    let prices = load_prices(&Sheet::open(&sources.prices, None)?)?;
    info!(
        path = %sources.prices.display(),
        months = prices.height(),
        series = prices.width() - 1,
        "Loaded prices"
    );

    let mut fragments = vec![production, prices];
    for source in &sources.macros {
        let series = source.load()?;
        info!(
            name = %source.name,
            path = %source.path.display(),
            months = series.height(),
            "Loaded macro series"
        );
        fragments.push(series);
    }

    Ok(Panel::assemble(fragments)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PRODUCTION: &str = "\
H04,H05,MO012021,MO022021,MO032021
Physical volume of mining production,Copper,40.5,41.0,39.8
";

    const PRICES: &str = "\
,COPPER
Copper,
$/mt,
LME,
MO022021,8460
MO032021,9004
";

    const RATES: &str = "\
date,repo_rate
2021-01-31,3.5
2021-03-31,3.5
";

    fn write_fixture(dir: &Path) -> DataSources {
        fs::create_dir_all(dir).unwrap();
        let production = dir.join("production.csv");
        let prices = dir.join("prices.csv");
        let rates = dir.join("rates.csv");
        fs::write(&production, PRODUCTION).unwrap();
        fs::write(&prices, PRICES).unwrap();
        fs::write(&rates, RATES).unwrap();

        DataSources::from_data_dir(
            dir,
            Some(production),
            Some(prices),
            vec![MacroSource::new("repo_rate", rates)],
        )
    }

    #[test]
    fn test_default_file_names() {
        let sources = DataSources::from_data_dir(Path::new("data"), None, None, vec![]);
        assert_eq!(sources.production, Path::new("data").join(PRODUCTION_FILE));
        assert_eq!(sources.prices, Path::new("data").join(PRICES_FILE));
        assert!(sources.macro_names().is_empty());
    }

    #[test]
    fn test_load_panel_from_files() {
        let dir = std::env::temp_dir().join(format!("lode_pipeline_{}", std::process::id()));
        let sources = write_fixture(&dir);

        let panel = load_panel(&sources, &ProductionLayout::default()).unwrap();
        assert_eq!(panel.height(), 3);
        assert_eq!(
            panel.column_names(),
            vec!["prod_copper", "price_copper", "repo_rate"]
        );
        assert_eq!(
            panel.series("repo_rate").unwrap(),
            vec![Some(3.5), None, Some(3.5)]
        );

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_input_file() {
        let sources = DataSources::from_data_dir(
            Path::new("/nonexistent/lode"),
            None,
            None,
            vec![],
        );
        assert!(matches!(
            load_panel(&sources, &ProductionLayout::default()),
            Err(PipelineError::MissingInput(_))
        ));
    }
}
