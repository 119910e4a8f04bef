//! XLSX constants and default preset factories.

use crate::spec::{EnumColumnFormat, SpecCellFormat, SpecXlsxFormatPresets};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Stored percent values above this are treated as whole percentages (`50.0` = 50%).
///
/// Values in `(1, 2]` are ambiguous under this rule and are kept as fractions.
pub const THR_PERCENT_WHOLE: f64 = 2.0;

/// Currency number format (Brazilian Real style).
pub const C_NUM_FORMAT_CURRENCY: &str = "\"R$\" #,##0.00";
/// Percentage number format.
pub const C_NUM_FORMAT_PERCENT: &str = "0.00%";
/// Integer number format.
pub const C_NUM_FORMAT_INTEGER: &str = "0";

/// Header label fragments that select percentage format in the label heuristic.
pub const TUP_LABEL_HINTS_PERCENT: [&str; 2] = ["%", "comparison"];
/// Header label fragments that select currency format in the label heuristic.
pub const TUP_LABEL_HINTS_CURRENCY: [&str; 5] =
    ["sum", "mean", "average", "reference", "competitor"];

/// Build default format presets used by [`crate::writer::XlsxWriter`].
pub fn derive_default_xlsx_formats() -> SpecXlsxFormatPresets {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        border: Some(1),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    SpecXlsxFormatPresets {
        header: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            align: Some("center".to_string()),
            bg_color: Some("#D9E1F2".to_string()),
            text_wrap: Some(true),
            ..Default::default()
        }),
        label: cfg_base_fmt_spec.with_(SpecCellFormat {
            align: Some("left".to_string()),
            ..Default::default()
        }),
        text: cfg_base_fmt_spec.with_(SpecCellFormat {
            align: Some("center".to_string()),
            ..Default::default()
        }),
        integer: cfg_base_fmt_spec.with_(SpecCellFormat {
            align: Some("center".to_string()),
            num_format: Some(C_NUM_FORMAT_INTEGER.to_string()),
            ..Default::default()
        }),
        currency: cfg_base_fmt_spec.with_(SpecCellFormat {
            align: Some("right".to_string()),
            num_format: Some(C_NUM_FORMAT_CURRENCY.to_string()),
            ..Default::default()
        }),
        percent: cfg_base_fmt_spec.with_(SpecCellFormat {
            align: Some("center".to_string()),
            num_format: Some(C_NUM_FORMAT_PERCENT.to_string()),
            ..Default::default()
        }),
    }
}

/// Pick the preset for one column format kind.
pub fn select_preset(presets: &SpecXlsxFormatPresets, kind: EnumColumnFormat) -> &SpecCellFormat {
    match kind {
        EnumColumnFormat::Label => &presets.label,
        EnumColumnFormat::Text => &presets.text,
        EnumColumnFormat::Integer => &presets.integer,
        EnumColumnFormat::Currency => &presets.currency,
        EnumColumnFormat::Percent => &presets.percent,
    }
}
