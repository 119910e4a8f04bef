//! `pricekit_survey` v1:
//! Price-survey data model, competitiveness metrics and report export.
//!
//! - `conf`      : column layout, labels and section names
//! - `spec`      : rows, summary tables, report models and errors
//! - `util`      : ratio math, display formatting, table assembly
//! - `normalize` : price parsing and the valid-row predicate
//! - `metrics`   : summary-table calculators
//! - `report`    : ordered report assembly
//! - `export`    : report-to-workbook serialization
//! - `store`     : record store contract and in-memory store
//! - `session`   : field-staff entry session
pub mod conf;
pub mod export;
pub mod metrics;
pub mod normalize;
pub mod report;
pub mod session;
pub mod spec;
pub mod store;
pub mod util;

pub use export::{serialize_report, serialize_report_with_options};
pub use metrics::{
    SpecMetricRecord, aggregate_by, calculate_comparison_metrics, calculate_competitiveness,
    calculate_matrix, calculate_product_crosstab,
};
pub use normalize::{convert_price_text, derive_valid_price, derive_valid_row, select_valid_rows};
pub use report::{build_report, build_report_with_options, derive_full_dump};
pub use session::{
    EnumNavOutcome, EnumRole, SessionContext, SpecEntryView, SpecPendingEdit,
    derive_buyer_options, derive_store_options, select_work_rows,
};
pub use spec::{
    EnumAggregation, EnumDimension, EnumMatrixMode, EnumReportSection, EnumValueMode,
    SpecCellUpdate, SpecExportArtifact, SpecReport, SpecReportOptions, SpecSummaryTable,
    SpecSurveyRow, SpecValidRow, SurveyError,
};
pub use store::{InMemoryRecordStore, RecordStore, plan_row_update};
pub use util::{derive_ratio_percent, format_brl, format_percent_br};
