//! Report export: one styled sheet per non-empty section.

use pricekit_io_xlsx::{
    SpecXlsxSheetWriteOptions, SpecXlsxWriteOptions, XlsxWriter, derive_default_xlsx_formats,
};

use crate::conf::{C_EXPORT_FILE_NAME, C_EXPORT_MIME_TYPE};
use crate::spec::{SpecExportArtifact, SpecReport, SpecSummaryTable, SurveyError};

/// Serialize a report with the default presets and write options.
pub fn serialize_report(report: &SpecReport) -> Result<SpecExportArtifact, SurveyError> {
    serialize_report_with_options(report, SpecXlsxWriteOptions::default())
}

/// Serialize a report into workbook bytes.
///
/// Empty sections produce no sheet. A section that fails to render is skipped
/// and reported in `warnings`; the remaining sections are still written.
/// When no section yields a sheet the result is [`SurveyError::EmptyReport`].
pub fn serialize_report_with_options(
    report: &SpecReport,
    write_options: SpecXlsxWriteOptions,
) -> Result<SpecExportArtifact, SurveyError> {
    let mut writer = XlsxWriter::new(derive_default_xlsx_formats(), write_options);

    for (c_name, section) in report.iter() {
        let table = section.table();
        if let Err(err) = writer.write_sheet_from_dataframe(
            &table.df,
            c_name,
            Some(table.header_grid.as_slice()),
            &derive_sheet_options(table),
        ) {
            writer.warn(format!("Skipped section {c_name:?}: {err}"));
        }
    }

    if writer.report().sheets.is_empty() {
        log::warn!("no sheet written for {} sections", report.len());
        return Err(SurveyError::EmptyReport);
    }

    let bytes = writer.save_to_buffer().map_err(SurveyError::Export)?;
    let write_report = writer.report();
    log::info!(
        "exported {} sheets ({} bytes, {} warnings)",
        write_report.sheets.len(),
        bytes.len(),
        write_report.warnings.len()
    );

    Ok(SpecExportArtifact {
        bytes,
        file_name: C_EXPORT_FILE_NAME.to_string(),
        mime_type: C_EXPORT_MIME_TYPE.to_string(),
        sheet_names: write_report.sheet_names(),
        warnings: write_report.warnings,
    })
}

fn derive_sheet_options(table: &SpecSummaryTable) -> SpecXlsxSheetWriteOptions {
    SpecXlsxSheetWriteOptions {
        n_cols_index: table.n_cols_index,
        fmts_by_col: Some(table.fmts_by_col.clone()),
        col_freeze: table.n_cols_index,
        row_freeze: None,
        if_merge_header: table.header_grid.len() > 1,
    }
}
