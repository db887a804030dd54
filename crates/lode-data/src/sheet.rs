//! Spreadsheet reading.
//!
//! Every loader works on a [`Sheet`]: a header row plus a grid of typed
//! [`Cell`]s. `.csv` files are read with the `csv` crate and Excel/ODS
//! workbooks with `calamine`. The format is chosen from the file extension
//! only.

use crate::error::{DataError, Result};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

static YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})[-/M](\d{1,2})$").expect("valid year-month pattern"));

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%Y%m%d"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank cell
    Empty,
    /// Numeric cell
    Number(f64),
    /// Text cell
    Text(String),
    /// Boolean cell
    Bool(bool),
    /// Native spreadsheet date
    Date(NaiveDate),
}

impl Cell {
    /// Build a cell from raw text, recognising numbers.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else if let Ok(value) = trimmed.parse::<f64>() {
            Self::Number(value)
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// Numeric coercion. Non-numeric content is `None`, never an error.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            Self::Text(s) => {
                let cleaned: String = s.chars().filter(|c| *c != ',' && *c != ' ').collect();
                cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
            }
            _ => None,
        }
    }

    /// Text rendering, used for headers and identifier columns.
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
            Self::Number(v) => v.to_string(),
            Self::Text(s) => s.trim().to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Date(d) => d.to_string(),
        }
    }

    /// Generic calendar-date coercion.
    ///
    /// Whole numbers with eight digits are read as compact `YYYYMMDD` dates,
    /// since CSV text such as `20200131` is typed as a number.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Text(s) => parse_calendar_date(s),
            Self::Number(v) if v.fract() == 0.0 && (1e7..1e8).contains(v) => {
                NaiveDate::parse_from_str(&(*v as i64).to_string(), "%Y%m%d").ok()
            }
            _ => None,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Self::Empty,
            Data::Int(i) => Self::Number(*i as f64),
            Data::Float(f) => Self::Number(*f),
            Data::Bool(b) => Self::Bool(*b),
            Data::String(s) => Self::from_text(s),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map_or_else(|| Self::Number(dt.as_f64()), |d| Self::Date(d.date())),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Self::Text(s.clone()),
        }
    }
}

/// Parse a calendar date written in one of the common layouts found in
/// statistical downloads. Month-only forms (`2020-01`, `2020M01`) map to the
/// first day of the month.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(caps) = YEAR_MONTH.captures(raw) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// A 2-D table of cells with a header row.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Create a sheet from an explicit header and data rows.
    pub fn new(name: impl Into<String>, header: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            header,
            rows,
        }
    }

    /// Create a sheet whose first row is the header.
    pub fn from_rows(name: impl Into<String>, mut rows: Vec<Vec<Cell>>) -> Result<Self> {
        let name = name.into();
        if rows.is_empty() {
            return Err(DataError::EmptySheet(name));
        }
        let header = rows.remove(0).iter().map(Cell::to_text).collect();
        Ok(Self::new(name, header, rows))
    }

    /// Read CSV text; the first record is the header.
    pub fn from_csv_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::from_text).collect());
        }
        Self::from_rows(name, rows)
    }

    /// Open a spreadsheet file.
    ///
    /// For workbooks, the tab named `preferred_tab` (case-insensitive) is used
    /// when present, otherwise the first tab.
    pub fn open(path: &Path, preferred_tab: Option<&str>) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let display = path.display().to_string();

        let sheet = match extension.as_str() {
            "csv" => Self::from_csv_reader(display, std::fs::File::open(path)?)?,
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => {
                let mut workbook = open_workbook_auto(path)?;
                let names = workbook.sheet_names();
                let tab = preferred_tab
                    .and_then(|wanted| {
                        names
                            .iter()
                            .find(|name| name.eq_ignore_ascii_case(wanted))
                            .cloned()
                    })
                    .or_else(|| names.first().cloned())
                    .ok_or_else(|| DataError::EmptySheet(display.clone()))?;

                let range = workbook.worksheet_range(&tab)?;
                let rows = range
                    .rows()
                    .map(|row| row.iter().map(Cell::from).collect())
                    .collect();
                Self::from_rows(format!("{display}[{tab}]"), rows)?
            }
            other => return Err(DataError::UnsupportedFormat(other.to_string())),
        };

        tracing::debug!(
            source = %sheet.name,
            columns = sheet.header.len(),
            rows = sheet.rows.len(),
            "read sheet"
        );
        Ok(sheet)
    }

    /// Sheet name, used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Header row, trimmed.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows (everything after the header).
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Index of the first header equal to `name` (after trimming).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    /// Cell at `(row, column)`; ragged rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&Cell::Empty)
    }
}
