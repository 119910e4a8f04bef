//! Shared XLSX specification models.

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification, converted to a `rust_xlsxwriter::Format` at write time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Rendering kind of one sheet column.
///
/// Supplied per table by whoever builds the table, so the writer never has to
/// guess a number format from header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumColumnFormat {
    /// Leading row-label column (left aligned, wide).
    Label,
    /// Plain centered value.
    Text,
    /// Whole-number counts.
    Integer,
    /// Money amount.
    Currency,
    /// Percentage; see [`crate::conf::THR_PERCENT_WHOLE`].
    Percent,
}

/// Named presets, one per [`EnumColumnFormat`] plus the header cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxFormatPresets {
    /// Header cells (all header rows).
    pub header: SpecCellFormat,
    /// Row-label columns.
    pub label: SpecCellFormat,
    /// Plain values.
    pub text: SpecCellFormat,
    /// Counts.
    pub integer: SpecCellFormat,
    /// Money.
    pub currency: SpecCellFormat,
    /// Percentages.
    pub percent: SpecCellFormat,
}

/// Normalized cell value during conversion/write pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Column width policy.
///
/// Label columns are sized to their longest text within `[width_label_min,
/// width_label_max]`; data columns all get `width_data`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecColumnWidthPolicy {
    /// Minimum label column width.
    pub width_label_min: usize,
    /// Maximum label column width.
    pub width_label_max: usize,
    /// Padding added to the measured label width.
    pub width_label_padding: usize,
    /// Fixed data column width.
    pub width_data: f64,
}

impl Default for SpecColumnWidthPolicy {
    fn default() -> Self {
        Self {
            width_label_min: 25,
            width_label_max: 60,
            width_label_padding: 2,
            width_data: 14.0,
        }
    }
}

/// Writer-wide options.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecXlsxWriteOptions {
    /// Threshold above which percent values are divided by 100 before writing.
    pub thr_percent_whole: f64,
    /// Replacement character for illegal sheet-name characters; empty strips them.
    pub sheet_name_replace_to: String,
    /// Column width policy.
    pub width_policy: SpecColumnWidthPolicy,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            thr_percent_whole: crate::conf::THR_PERCENT_WHOLE,
            sheet_name_replace_to: String::new(),
            width_policy: SpecColumnWidthPolicy::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetFormatSpecification

/// Rectangular merge plan item (inclusive bounds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetMerge {
    /// First row.
    pub row_idx_start: usize,
    /// Last row.
    pub row_idx_end: usize,
    /// First column.
    pub col_idx_start: usize,
    /// Last column.
    pub col_idx_end: usize,
    /// Merge display text.
    pub text: String,
}

/// One sheet that was attached to the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetWritten {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Header rows written above the data.
    pub n_rows_header: usize,
    /// Data rows written.
    pub n_rows_data: usize,
    /// Columns written.
    pub n_cols: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Accumulated write report for one workbook.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheets attached, in workbook order.
    pub sheets: Vec<SpecSheetWritten>,
    /// Non-fatal warnings (skipped sheets and the like).
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.sheet_name.clone()).collect()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
