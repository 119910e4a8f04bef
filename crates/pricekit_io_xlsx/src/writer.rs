//! XLSX writer kernel that converts DataFrames into in-memory workbook bytes.

use std::collections::BTreeSet;

use polars::prelude::{AnyValue, DataFrame};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, select_preset};
use crate::spec::{
    EnumCellValue, EnumColumnFormat, SpecCellFormat, SpecSheetWritten, SpecXlsxFormatPresets,
    SpecXlsxReport, SpecXlsxWriteOptions,
};
use crate::util::{
    convert_cell_value, derive_format_from_label, derive_merge_tracker,
    estimate_unicode_string_width, group_merges_by_row, plan_header_merges, sanitize_sheet_name,
};

/// Per-sheet call options.
#[derive(Default, Debug, Clone)]
pub struct SpecXlsxSheetWriteOptions {
    /// Number of leading row-label columns.
    pub n_cols_index: usize,
    /// Explicit format per column; inferred from the deepest header label when `None`.
    pub fmts_by_col: Option<Vec<EnumColumnFormat>>,
    /// Number of frozen columns.
    pub col_freeze: usize,
    /// Frozen row index; defaults to header height when `None`.
    pub row_freeze: Option<usize>,
    /// Enable merged multi-row header behavior.
    pub if_merge_header: bool,
}

/// Stateful in-memory workbook writer.
pub struct XlsxWriter {
    workbook: Workbook,
    presets: SpecXlsxFormatPresets,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_existing: BTreeSet<String>,
    report: SpecXlsxReport,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer with format presets and options.
    pub fn new(presets: SpecXlsxFormatPresets, write_options: SpecXlsxWriteOptions) -> Self {
        Self {
            workbook: Workbook::new(),
            presets,
            write_options,
            set_sheet_names_existing: BTreeSet::new(),
            report: SpecXlsxReport::default(),
            if_closed: false,
        }
    }

    /// Return immutable snapshot of the write report.
    pub fn report(&self) -> SpecXlsxReport {
        self.report.clone()
    }

    /// Record a non-fatal warning in the write report.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        log::warn!("{}", msg.as_ref());
        self.report.warn(msg);
    }

    /// Serialize the workbook to bytes. No further sheets can be written afterwards.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, String> {
        if self.if_closed {
            return Err("Workbook already saved.".to_string());
        }
        let v_bytes = self
            .workbook
            .save_to_buffer()
            .map_err(derive_xlsx_error_text)?;
        self.if_closed = true;
        Ok(v_bytes)
    }

    /// Write one sheet from an in-memory dataframe.
    ///
    /// `header_grid` holds one row per header level and must be as wide as
    /// `df_data`; the column names are used as a single header row when it is
    /// `None`. Returns the attached sheet name, or `None` when `df_data` has
    /// no rows and nothing was written.
    ///
    /// The sheet is rendered detached and only attached to the workbook once it
    /// is complete, so a failure leaves the workbook untouched.
    pub fn write_sheet_from_dataframe(
        &mut self,
        df_data: &DataFrame,
        sheet_name: &str,
        header_grid: Option<&[Vec<String>]>,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<Option<String>, String> {
        if self.if_closed {
            return Err("Cannot write after save_to_buffer().".to_string());
        }
        if df_data.height() == 0 {
            log::debug!("skip empty sheet {sheet_name:?}");
            return Ok(None);
        }

        let sheet_name_unique =
            self.derive_unique_sheet_name(&sanitize_sheet_name(
                sheet_name,
                &self.write_options.sheet_name_replace_to,
            ));
        let (worksheet, sheet_written) =
            self.render_sheet(df_data, &sheet_name_unique, header_grid, options)?;

        self.workbook.push_worksheet(worksheet);
        self.set_sheet_names_existing
            .insert(sheet_name_unique.to_lowercase());
        self.report.sheets.push(sheet_written);
        Ok(Some(sheet_name_unique))
    }

    fn render_sheet(
        &self,
        df_data: &DataFrame,
        sheet_name: &str,
        header_grid: Option<&[Vec<String>]>,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(Worksheet, SpecSheetWritten), String> {
        let l_colnames_df: Vec<String> = df_data
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        let n_width_df = l_colnames_df.len();
        let n_height_df = df_data.height();

        let l_header_grid: Vec<Vec<String>> = match header_grid {
            Some(grid) => {
                if grid.is_empty() {
                    return Err(
                        "header_grid must have >= 1 row (0-row header is not allowed).".to_string(),
                    );
                }
                if grid.iter().any(|row| row.len() != n_width_df) {
                    return Err("header_grid width must equal df.width.".to_string());
                }
                grid.to_vec()
            }
            None => vec![l_colnames_df.clone()],
        };
        let n_rows_header = l_header_grid.len();

        if n_width_df > N_NCOLS_EXCEL_MAX {
            return Err(format!(
                "Sheet {sheet_name:?} has {n_width_df} columns; Excel allows {N_NCOLS_EXCEL_MAX}."
            ));
        }
        if n_rows_header + n_height_df > N_NROWS_EXCEL_MAX {
            return Err(format!(
                "Sheet {sheet_name:?} has {} rows; Excel allows {N_NROWS_EXCEL_MAX}.",
                n_rows_header + n_height_df
            ));
        }

        let l_fmt_kinds = derive_column_format_kinds(
            &l_header_grid,
            options.n_cols_index,
            options.fmts_by_col.as_deref(),
        )?;
        let l_fmt_data_by_col: Vec<Format> = l_fmt_kinds
            .iter()
            .map(|kind| derive_rust_xlsx_format(select_preset(&self.presets, *kind)))
            .collect();
        let fmt_header = derive_rust_xlsx_format(&self.presets.header);

        let mut worksheet = Worksheet::new();
        worksheet
            .set_name(sheet_name)
            .map_err(derive_xlsx_error_text)?;

        write_header(
            &mut worksheet,
            &l_header_grid,
            options.if_merge_header,
            options.n_cols_index,
            &fmt_header,
        )?;

        let n_row_freeze = options.row_freeze.unwrap_or(n_rows_header);
        worksheet
            .set_freeze_panes(
                cast_row_num(n_row_freeze)?,
                cast_col_num(options.col_freeze)?,
            )
            .map_err(derive_xlsx_error_text)?;

        let mut l_width_by_col_label = vec![0usize; n_width_df];
        for (n_idx_col, kind) in l_fmt_kinds.iter().enumerate() {
            if *kind != EnumColumnFormat::Label {
                continue;
            }
            for row in &l_header_grid {
                l_width_by_col_label[n_idx_col] = usize::max(
                    l_width_by_col_label[n_idx_col],
                    estimate_unicode_string_width(&row[n_idx_col]),
                );
            }
        }

        let l_cols = df_data.get_columns();
        for n_row_local in 0..n_height_df {
            for (n_idx_col, col) in l_cols.iter().enumerate() {
                let fmt_kind = l_fmt_kinds[n_idx_col];
                let value_raw = derive_cell_value_from_any_value(
                    col.get(n_row_local)
                        .map_err(|err| format!("Failed to access cell value: {err}"))?,
                );
                let value = convert_cell_value(
                    &value_raw,
                    fmt_kind,
                    self.write_options.thr_percent_whole,
                );

                if fmt_kind == EnumColumnFormat::Label
                    && let EnumCellValue::String(s) = &value
                {
                    l_width_by_col_label[n_idx_col] = usize::max(
                        l_width_by_col_label[n_idx_col],
                        estimate_unicode_string_width(s),
                    );
                }

                write_cell_with_format(
                    &mut worksheet,
                    n_rows_header + n_row_local,
                    n_idx_col,
                    &value,
                    &l_fmt_data_by_col[n_idx_col],
                )?;
            }
        }

        let policy = &self.write_options.width_policy;
        let n_min = usize::max(1, policy.width_label_min);
        let n_max = usize::min(255, usize::max(n_min, policy.width_label_max));
        for (n_idx_col, kind) in l_fmt_kinds.iter().enumerate() {
            let n_width_final = if *kind == EnumColumnFormat::Label {
                usize::min(
                    n_max,
                    usize::max(n_min, l_width_by_col_label[n_idx_col] + policy.width_label_padding),
                ) as f64
            } else {
                policy.width_data
            };
            worksheet
                .set_column_width(cast_col_num(n_idx_col)?, n_width_final)
                .map_err(derive_xlsx_error_text)?;
        }

        Ok((
            worksheet,
            SpecSheetWritten {
                sheet_name: sheet_name.to_string(),
                n_rows_header,
                n_rows_data: n_height_df,
                n_cols: n_width_df,
            },
        ))
    }

    /// Excel compares sheet names case-insensitively; the set holds lowercased names.
    fn derive_unique_sheet_name(&self, name: &str) -> String {
        if !self.set_sheet_names_existing.contains(&name.to_lowercase()) {
            return name.to_string();
        }

        let base_name: String = name
            .chars()
            .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
            .collect();

        let mut n_idx = 2usize;
        loop {
            let candidate: String = format!("{base_name}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect();
            if !self
                .set_sheet_names_existing
                .contains(&candidate.to_lowercase())
            {
                return candidate;
            }
            n_idx += 1;
        }
    }
}

/// Resolve the format kind of every column.
///
/// Explicit kinds win; otherwise the first `n_cols_index` columns are labels
/// and the rest are inferred from the deepest header label.
pub fn derive_column_format_kinds(
    header_grid: &[Vec<String>],
    n_cols_index: usize,
    fmts_by_col: Option<&[EnumColumnFormat]>,
) -> Result<Vec<EnumColumnFormat>, String> {
    let Some(v_header_deepest) = header_grid.last() else {
        return Err("header_grid must have >= 1 row.".to_string());
    };
    let n_width = v_header_deepest.len();

    if let Some(l_fmts) = fmts_by_col {
        if l_fmts.len() != n_width {
            return Err(format!(
                "fmts_by_col has {} entries; expected {n_width}.",
                l_fmts.len()
            ));
        }
        return Ok(l_fmts.to_vec());
    }

    Ok(v_header_deepest
        .iter()
        .enumerate()
        .map(|(n_idx_col, c_label)| {
            if n_idx_col < n_cols_index {
                EnumColumnFormat::Label
            } else {
                derive_format_from_label(c_label)
            }
        })
        .collect())
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => {
            EnumCellValue::String(if val { "True" } else { "False" }.to_string())
        }
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

fn write_header(
    worksheet: &mut Worksheet,
    header_grid: &[Vec<String>],
    if_merge: bool,
    n_cols_index: usize,
    fmt_header: &Format,
) -> Result<(), String> {
    let l_merges = if if_merge {
        plan_header_merges(header_grid, n_cols_index)
    } else {
        vec![]
    };
    let set_merged_cells = derive_merge_tracker(&l_merges);
    let dict_merges_by_row = group_merges_by_row(&l_merges);
    let set_merge_anchors: BTreeSet<(usize, usize)> = l_merges
        .iter()
        .map(|merge| (merge.row_idx_start, merge.col_idx_start))
        .collect();

    for (row_idx, row_values) in header_grid.iter().enumerate() {
        for (col_idx, cell_value) in row_values.iter().enumerate() {
            if set_merged_cells.contains(&(row_idx, col_idx))
                || set_merge_anchors.contains(&(row_idx, col_idx))
            {
                continue;
            }

            if cell_value.is_empty() {
                worksheet
                    .write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, fmt_header)
                    .map_err(derive_xlsx_error_text)?;
            } else {
                worksheet
                    .write_string_with_format(
                        cast_row_num(row_idx)?,
                        cast_col_num(col_idx)?,
                        cell_value,
                        fmt_header,
                    )
                    .map_err(derive_xlsx_error_text)?;
            }
        }

        if let Some(l_merges_row) = dict_merges_by_row.get(&row_idx) {
            for merge in l_merges_row {
                worksheet
                    .merge_range(
                        cast_row_num(merge.row_idx_start)?,
                        cast_col_num(merge.col_idx_start)?,
                        cast_row_num(merge.row_idx_end)?,
                        cast_col_num(merge.col_idx_end)?,
                        &merge.text,
                        fmt_header,
                    )
                    .map_err(derive_xlsx_error_text)?;
            }
        }
    }

    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), String> {
    match value {
        EnumCellValue::None => {
            worksheet
                .write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    *val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}
