//! Survey constants: column layout, labels, report section names.

/// Positional column index of `store` in the source table.
pub const N_COL_STORE: usize = 0;
/// Positional column index of `buyer`.
pub const N_COL_BUYER: usize = 1;
/// Positional column index of `product`.
pub const N_COL_PRODUCT: usize = 2;
/// Positional column index of `competitor_price`.
pub const N_COL_COMPETITOR_PRICE: usize = 3;
/// Positional column index of `note`.
pub const N_COL_NOTE: usize = 4;
/// Positional column index of `competitor`.
pub const N_COL_COMPETITOR: usize = 5;
/// Positional column index of `reference_price`.
pub const N_COL_REFERENCE_PRICE: usize = 6;
/// Number of positional columns read from the source table.
pub const N_COLS_SURVEY: usize = 7;

/// Sheet row of source row 0 (1-based, below the header row).
pub const N_SHEET_ROW_OFFSET: usize = 2;
/// 1-based sheet column holding `competitor_price` (D).
pub const N_SHEET_COL_COMPETITOR_PRICE: usize = N_COL_COMPETITOR_PRICE + 1;
/// 1-based sheet column holding `note` (E).
pub const N_SHEET_COL_NOTE: usize = N_COL_NOTE + 1;

/// Label of the synthetic totals row.
pub const C_LABEL_TOTAL: &str = "TOTAL";
/// Filter option meaning "no filter".
pub const C_OPTION_ALL: &str = "All";
/// Separator joining the two column-group dimensions of a matrix header.
pub const C_GROUP_SEPARATOR: &str = " - ";

/// Metric labels.
pub const C_METRIC_FOUND: &str = "Found";
pub const C_METRIC_LOWER: &str = "Lower";
pub const C_METRIC_HIGHER: &str = "Higher";
pub const C_METRIC_PCT_LOWER: &str = "%Lower";
pub const C_METRIC_PCT_HIGHER: &str = "%Higher";
pub const C_METRIC_SUM_REFERENCE: &str = "SumReference";
pub const C_METRIC_SUM_COMPETITOR: &str = "SumCompetitor";
pub const C_METRIC_COMPETITIVENESS: &str = "Competitiveness%";
pub const C_METRIC_MEAN_REFERENCE: &str = "MeanReference";
pub const C_METRIC_MEAN_COMPETITOR: &str = "MeanCompetitor";
pub const C_METRIC_RATIO: &str = "Ratio%";

/// Full-dump column headers, in source order.
pub const TUP_FULL_DUMP_HEADERS: [&str; N_COLS_SURVEY] = [
    "Store",
    "Buyer",
    "Product",
    "Competitor Price",
    "Note",
    "Competitor",
    "Reference Price",
];

/// Report section names, in report order.
pub const C_SECTION_COMPARISON_BUYER: &str = "Comparison by Buyer";
pub const C_SECTION_COMPARISON_COMPETITOR: &str = "Comparison by Competitor";
pub const C_SECTION_COMPARISON_STORE: &str = "Comparison by Store";
pub const C_SECTION_COMPETITIVENESS_BUYER: &str = "Competitiveness by Buyer";
pub const C_SECTION_COMPETITIVENESS_STORE: &str = "Competitiveness by Store";
pub const C_SECTION_COMPETITIVENESS_COMPETITOR: &str = "Competitiveness by Competitor";
pub const C_SECTION_MATRIX_COUNT: &str = "Store x Competitor x Buyer";
pub const C_SECTION_MATRIX_SUM: &str = "Store x Competitor x Buyer Sum";
pub const C_SECTION_PRODUCTS_MEAN: &str = "Products Mean";
pub const C_SECTION_PRODUCTS_SUM: &str = "Products Sum";
pub const C_SECTION_FULL_DUMP: &str = "Full Dump";

/// Suggested download file name for the exported report.
pub const C_EXPORT_FILE_NAME: &str = "price_survey_report.xlsx";
/// MIME type of the exported report.
pub const C_EXPORT_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
