//! `pricekit_io_xlsx` v1:
//! Rust-side XLSX report writer kernel.
//!
//! - `conf`   : constants and default presets
//! - `spec`   : specs/models/options
//! - `util`   : pure helper functions
//! - `writer` : DataFrame-to-workbook writer
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, THR_PERCENT_WHOLE,
    TUP_EXCEL_ILLEGAL, derive_default_xlsx_formats,
};
pub use spec::{
    EnumCellValue, EnumColumnFormat, SpecCellFormat, SpecColumnWidthPolicy, SpecSheetMerge,
    SpecSheetWritten, SpecXlsxFormatPresets, SpecXlsxReport, SpecXlsxWriteOptions,
};
pub use util::{
    convert_cell_value, derive_format_from_label, derive_merge_tracker, plan_header_merges,
    sanitize_sheet_name,
};
pub use writer::{SpecXlsxSheetWriteOptions, XlsxWriter, derive_column_format_kinds};
