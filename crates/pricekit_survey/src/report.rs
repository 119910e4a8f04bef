//! Report assembly: every summary view plus the raw dump, in a fixed order.

use pricekit_io_xlsx::{EnumCellValue, EnumColumnFormat};

use crate::conf::{
    C_SECTION_COMPARISON_BUYER, C_SECTION_COMPARISON_COMPETITOR, C_SECTION_COMPARISON_STORE,
    C_SECTION_COMPETITIVENESS_BUYER, C_SECTION_COMPETITIVENESS_COMPETITOR,
    C_SECTION_COMPETITIVENESS_STORE, C_SECTION_FULL_DUMP, C_SECTION_MATRIX_COUNT,
    C_SECTION_MATRIX_SUM, C_SECTION_PRODUCTS_MEAN, C_SECTION_PRODUCTS_SUM, TUP_FULL_DUMP_HEADERS,
};
use crate::metrics::{
    calculate_comparison_metrics, calculate_competitiveness, calculate_matrix,
    calculate_product_crosstab,
};
use crate::normalize::select_valid_rows;
use crate::spec::{
    EnumAggregation, EnumDimension, EnumMatrixMode, EnumReportSection, SpecReport,
    SpecReportOptions, SpecSummaryTable, SpecSurveyRow, SurveyError,
};
use crate::util::SpecTableDraft;

const TUP_FULL_DUMP_FORMATS: [EnumColumnFormat; 7] = [
    EnumColumnFormat::Label,
    EnumColumnFormat::Label,
    EnumColumnFormat::Label,
    EnumColumnFormat::Text,
    EnumColumnFormat::Text,
    EnumColumnFormat::Label,
    EnumColumnFormat::Text,
];

/// Build the export report with default options.
pub fn build_report(rows: &[SpecSurveyRow]) -> Result<SpecReport, SurveyError> {
    build_report_with_options(rows, &SpecReportOptions::default())
}

/// Build every report section from the raw survey rows.
///
/// Aggregated sections only see valid rows; the full dump carries every row
/// as entered.
pub fn build_report_with_options(
    rows: &[SpecSurveyRow],
    options: &SpecReportOptions,
) -> Result<SpecReport, SurveyError> {
    let valid = select_valid_rows(rows);
    log::debug!(
        "building report from {} rows ({} valid)",
        rows.len(),
        valid.len()
    );

    let mut report = SpecReport::default();
    for (c_name, dimension) in [
        (C_SECTION_COMPARISON_BUYER, EnumDimension::Buyer),
        (C_SECTION_COMPARISON_COMPETITOR, EnumDimension::Competitor),
        (C_SECTION_COMPARISON_STORE, EnumDimension::Store),
    ] {
        let table = calculate_comparison_metrics(&valid, dimension)?;
        report.insert(c_name, EnumReportSection::Summary(table));
    }
    for (c_name, dimension) in [
        (C_SECTION_COMPETITIVENESS_BUYER, EnumDimension::Buyer),
        (C_SECTION_COMPETITIVENESS_STORE, EnumDimension::Store),
        (C_SECTION_COMPETITIVENESS_COMPETITOR, EnumDimension::Competitor),
    ] {
        let table = calculate_competitiveness(&valid, dimension, options.value_mode)?;
        report.insert(c_name, EnumReportSection::Summary(table));
    }
    for (c_name, mode) in [
        (C_SECTION_MATRIX_COUNT, EnumMatrixMode::Count),
        (C_SECTION_MATRIX_SUM, EnumMatrixMode::Sum),
    ] {
        let table = calculate_matrix(
            &valid,
            EnumDimension::Buyer,
            (EnumDimension::Store, EnumDimension::Competitor),
            mode,
        )?;
        report.insert(c_name, EnumReportSection::Summary(table));
    }
    for (c_name, aggregation) in [
        (C_SECTION_PRODUCTS_MEAN, EnumAggregation::Mean),
        (C_SECTION_PRODUCTS_SUM, EnumAggregation::Sum),
    ] {
        let table = calculate_product_crosstab(&valid, aggregation)?;
        report.insert(c_name, EnumReportSection::Summary(table));
    }
    if !options.if_skip_full_dump {
        report.insert(
            C_SECTION_FULL_DUMP,
            EnumReportSection::FullDump(derive_full_dump(rows)?),
        );
    }

    for (c_name, section) in report.iter() {
        let table = section.table();
        log::debug!("section {c_name:?}: {}x{}", table.height(), table.width());
    }
    Ok(report)
}

/// Raw table with every column as text, in source order.
pub fn derive_full_dump(rows: &[SpecSurveyRow]) -> Result<SpecSummaryTable, SurveyError> {
    let mut draft = SpecTableDraft::new(&[], 1);
    for (c_label, fmt) in TUP_FULL_DUMP_HEADERS.iter().zip(TUP_FULL_DUMP_FORMATS) {
        draft.push_column(&[*c_label], fmt);
    }
    for row in rows {
        draft.push_row(
            row.to_cells()
                .iter()
                .map(|c| EnumCellValue::String(c.to_string()))
                .collect(),
        );
    }
    draft.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{C_LABEL_TOTAL, C_METRIC_FOUND};
    use crate::spec::EnumValueMode;

    fn create_rows() -> Vec<SpecSurveyRow> {
        vec![
            SpecSurveyRow::from_cells(&["A", "X", "P1", "10,00", "", "C1", "12,00"]),
            SpecSurveyRow::from_cells(&["A", "X", "P2", "15,00", "ok", "C1", "15,00"]),
            SpecSurveyRow::from_cells(&["B", "Y", "P1", "", "", "C2", "12,00"]),
        ]
    }

    #[test]
    fn test_build_report_section_order() {
        let report = build_report(&create_rows()).expect("report");
        assert_eq!(
            report.section_names(),
            vec![
                C_SECTION_COMPARISON_BUYER,
                C_SECTION_COMPARISON_COMPETITOR,
                C_SECTION_COMPARISON_STORE,
                C_SECTION_COMPETITIVENESS_BUYER,
                C_SECTION_COMPETITIVENESS_STORE,
                C_SECTION_COMPETITIVENESS_COMPETITOR,
                C_SECTION_MATRIX_COUNT,
                C_SECTION_MATRIX_SUM,
                C_SECTION_PRODUCTS_MEAN,
                C_SECTION_PRODUCTS_SUM,
                C_SECTION_FULL_DUMP,
            ]
        );
    }

    #[test]
    fn test_invalid_row_is_only_in_full_dump() {
        let report = build_report(&create_rows()).expect("report");

        let table = report.get(C_SECTION_COMPARISON_BUYER).expect("section").table();
        assert_eq!(table.find_row(&["Y"]), None);
        let n_total = table.find_row(&[C_LABEL_TOTAL]).expect("TOTAL");
        let n_col = table.find_col(None, C_METRIC_FOUND).expect("col");
        assert_eq!(table.number(n_total, n_col), Some(2.0));

        let dump = report.get(C_SECTION_FULL_DUMP).expect("dump");
        assert!(matches!(dump, EnumReportSection::FullDump(_)));
        let dump = dump.table();
        assert_eq!(dump.height(), 3);
        assert_eq!(dump.n_cols_index, 0);
        assert_eq!(dump.column_labels(), TUP_FULL_DUMP_HEADERS.to_vec());
        assert_eq!(dump.text(2, 0).as_deref(), Some("B"));
        assert_eq!(dump.text(2, 3).as_deref(), Some(""));
        assert_eq!(dump.text(1, 4).as_deref(), Some("ok"));
    }

    #[test]
    fn test_empty_input_yields_empty_sections() {
        let report = build_report(&[]).expect("report");
        assert_eq!(report.len(), 11);
        assert!(report.iter().all(|(_, section)| section.table().is_empty()));
    }

    #[test]
    fn test_options_display_mode_and_skip_dump() {
        let options = SpecReportOptions {
            value_mode: EnumValueMode::Display,
            if_skip_full_dump: true,
        };
        let report = build_report_with_options(&create_rows(), &options).expect("report");
        assert_eq!(report.len(), 10);
        assert!(report.get(C_SECTION_FULL_DUMP).is_none());

        let table = report
            .get(C_SECTION_COMPETITIVENESS_BUYER)
            .expect("section")
            .table();
        assert_eq!(table.text(0, 1).as_deref(), Some("R$ 27,00"));
    }
}
