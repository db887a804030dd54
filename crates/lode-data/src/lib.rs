#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lode/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod macro_series;
pub mod minerals;
pub mod month_code;
pub mod panel;
pub mod prices;
pub mod production;
pub mod sheet;

pub use error::{DataError, Result};
pub use macro_series::{MacroSource, load_macro_series};
pub use minerals::Mineral;
pub use month_code::{YearMonth, find_month_code, parse_month_code};
pub use panel::{DATE_COLUMN, Panel};
pub use prices::{PRICE_PREAMBLE_ROWS, load_prices};
pub use production::{ProductionLayout, load_production};
pub use sheet::{Cell, Sheet};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
