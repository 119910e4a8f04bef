//! Survey data model, report models and error types.

use polars::prelude::{AnyValue, DataFrame, PolarsError};
use pricekit_io_xlsx::EnumColumnFormat;

use crate::conf::{
    N_COL_BUYER, N_COL_COMPETITOR, N_COL_COMPETITOR_PRICE, N_COL_NOTE, N_COL_PRODUCT,
    N_COL_REFERENCE_PRICE, N_COL_STORE, N_COLS_SURVEY,
};

////////////////////////////////////////////////////////////////////////////////
// #region SurveyRows

/// One survey observation, as read from the record store.
///
/// Prices are kept as the raw text that was entered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecSurveyRow {
    pub store: String,
    pub buyer: String,
    pub product: String,
    pub competitor_price: String,
    pub note: String,
    pub competitor: String,
    pub reference_price: String,
}

impl SpecSurveyRow {
    /// Build a row from positional cells.
    ///
    /// Cells past the seventh are ignored; missing trailing cells read as empty text.
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Self {
        let cell = |n_idx: usize| {
            cells
                .get(n_idx)
                .map(|c| c.as_ref().to_string())
                .unwrap_or_default()
        };
        Self {
            store: cell(N_COL_STORE),
            buyer: cell(N_COL_BUYER),
            product: cell(N_COL_PRODUCT),
            competitor_price: cell(N_COL_COMPETITOR_PRICE),
            note: cell(N_COL_NOTE),
            competitor: cell(N_COL_COMPETITOR),
            reference_price: cell(N_COL_REFERENCE_PRICE),
        }
    }

    /// Positional cells in source column order.
    pub fn to_cells(&self) -> [&str; N_COLS_SURVEY] {
        [
            &self.store,
            &self.buyer,
            &self.product,
            &self.competitor_price,
            &self.note,
            &self.competitor,
            &self.reference_price,
        ]
    }

    /// Value of one grouping dimension.
    pub fn key(&self, dimension: EnumDimension) -> &str {
        match dimension {
            EnumDimension::Store => &self.store,
            EnumDimension::Buyer => &self.buyer,
            EnumDimension::Competitor => &self.competitor,
            EnumDimension::Product => &self.product,
        }
    }
}

/// A survey row whose two prices both parsed to positive numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecValidRow<'a> {
    /// Position of the row in the source table.
    pub row_index: usize,
    pub row: &'a SpecSurveyRow,
    pub competitor_price: f64,
    pub reference_price: f64,
}

impl SpecValidRow<'_> {
    pub fn key(&self, dimension: EnumDimension) -> &str {
        self.row.key(dimension)
    }
}

/// Grouping dimension of a summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnumDimension {
    Store,
    Buyer,
    Competitor,
    Product,
}

impl EnumDimension {
    /// Row-label header text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Store => "Store",
            Self::Buyer => "Buyer",
            Self::Competitor => "Competitor",
            Self::Product => "Product",
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CalculatorModes

/// Output mode of the sum/competitiveness calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumValueMode {
    /// Plain numbers, for export.
    #[default]
    Raw,
    /// Currency and percent strings, for on-screen display.
    Display,
}

/// Metric set of a matrix view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumMatrixMode {
    /// Found / Lower / Higher and their percentages.
    Count,
    /// Sums and competitiveness.
    Sum,
}

/// Aggregation applied to prices in the product cross-tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumAggregation {
    Mean,
    Sum,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SummaryTable

/// A pivoted summary table ready for display or export.
///
/// `df` holds the row-label columns first (`n_cols_index` of them) and the
/// metric columns after. `header_grid` has one row per header level, as wide
/// as `df`; `fmts_by_col` gives the rendering kind of every column.
#[derive(Debug, Clone)]
pub struct SpecSummaryTable {
    pub df: DataFrame,
    pub header_grid: Vec<Vec<String>>,
    pub n_cols_index: usize,
    pub fmts_by_col: Vec<EnumColumnFormat>,
}

impl SpecSummaryTable {
    /// Number of data rows (TOTAL included).
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Number of columns (labels included).
    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Deepest header label of every column.
    pub fn column_labels(&self) -> Vec<String> {
        self.header_grid.last().cloned().unwrap_or_default()
    }

    /// Locate a column by its top-level group (two-level headers) and metric label.
    pub fn find_col(&self, group: Option<&str>, label: &str) -> Option<usize> {
        let v_deepest = self.header_grid.last()?;
        (0..v_deepest.len()).find(|n_idx_col| {
            v_deepest[*n_idx_col] == label
                && match group {
                    Some(c_group) => {
                        self.header_grid.len() > 1 && self.header_grid[0][*n_idx_col] == c_group
                    }
                    None => true,
                }
        })
    }

    /// Locate a row by its label values (one per index column).
    pub fn find_row(&self, labels: &[&str]) -> Option<usize> {
        (0..self.height()).find(|n_idx_row| {
            labels
                .iter()
                .enumerate()
                .all(|(n_idx_col, label)| self.text(*n_idx_row, n_idx_col).as_deref() == Some(*label))
        })
    }

    /// Numeric cell value, `None` for null or non-numeric cells.
    pub fn number(&self, row_idx: usize, col_idx: usize) -> Option<f64> {
        match self.df.get_columns().get(col_idx)?.get(row_idx).ok()? {
            AnyValue::Float64(val) => Some(val),
            AnyValue::Float32(val) => Some(val as f64),
            AnyValue::UInt64(val) => Some(val as f64),
            AnyValue::Int64(val) => Some(val as f64),
            _ => None,
        }
    }

    /// Text cell value, `None` for null or non-text cells.
    pub fn text(&self, row_idx: usize, col_idx: usize) -> Option<String> {
        match self.df.get_columns().get(col_idx)?.get(row_idx).ok()? {
            AnyValue::String(val) => Some(val.to_string()),
            AnyValue::StringOwned(val) => Some(val.to_string()),
            _ => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Report

/// One named part of a report.
#[derive(Debug, Clone)]
pub enum EnumReportSection {
    /// Aggregated view over valid rows.
    Summary(SpecSummaryTable),
    /// Unfiltered source table.
    FullDump(SpecSummaryTable),
}

impl EnumReportSection {
    pub fn table(&self) -> &SpecSummaryTable {
        match self {
            Self::Summary(table) | Self::FullDump(table) => table,
        }
    }
}

/// Report assembly options.
#[derive(Debug, Clone, Default)]
pub struct SpecReportOptions {
    /// Value mode of the competitiveness sections.
    pub value_mode: EnumValueMode,
    /// Leave the unfiltered source table out of the report.
    pub if_skip_full_dump: bool,
}

/// Ordered mapping of section name to table.
#[derive(Debug, Clone, Default)]
pub struct SpecReport {
    sections: Vec<(String, EnumReportSection)>,
}

impl SpecReport {
    /// Append a section; a section with the same name is replaced in place.
    pub fn insert(&mut self, name: impl Into<String>, section: EnumReportSection) {
        let c_name = name.into();
        if let Some(slot) = self.sections.iter_mut().find(|(n, _)| *n == c_name) {
            slot.1 = section;
            return;
        }
        self.sections.push((c_name, section));
    }

    pub fn get(&self, name: &str) -> Option<&EnumReportSection> {
        self.sections
            .iter()
            .find(|(c_name, _)| c_name == name)
            .map(|(_, section)| section)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnumReportSection)> {
        self.sections
            .iter()
            .map(|(c_name, section)| (c_name.as_str(), section))
    }

    pub fn section_names(&self) -> Vec<String> {
        self.sections.iter().map(|(c_name, _)| c_name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Serialized report plus download metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExportArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    /// Sheets actually written, in workbook order.
    pub sheet_names: Vec<String>,
    /// Sections that were skipped because they failed to render.
    pub warnings: Vec<String>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StoreAddressing

/// One cell write against the backing spreadsheet (1-based coordinates).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCellUpdate {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Survey-level errors. None of them is fatal; callers surface the message.
#[derive(Debug, thiserror::Error)]
pub enum SurveyError {
    #[error("Row {row_index} does not exist (table has {n_rows} rows).")]
    RowIndexOutOfRange { row_index: usize, n_rows: usize },
    #[error("Record store rejected the update: {0}")]
    StoreRejected(String),
    #[error("Record store could not be read: {0}")]
    StoreUnavailable(String),
    #[error("Only the commercial role can export reports.")]
    PermissionDenied,
    #[error("Report has no rows to export.")]
    EmptyReport,
    #[error("Report export failed: {0}")]
    Export(String),
    #[error("Failed to assemble table: {0}")]
    Frame(#[from] PolarsError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
