//! Locale-aware price normalization and the valid-row predicate.

use crate::spec::{SpecSurveyRow, SpecValidRow};

/// Parse a comma-decimal price text; `NaN` when it does not parse to a finite number.
///
/// `"12,50"` and `" 12.50 "` both yield `12.5`. Only surrounding whitespace is
/// trimmed (`"1 5,5"` is `NaN`), and thousands separators are not understood
/// (`"1.234,56"` is `NaN`).
pub fn convert_price_text(text: &str) -> f64 {
    let c_text = text.trim().replace(',', ".");
    match c_text.parse::<f64>() {
        Ok(val) if val.is_finite() => val,
        _ => f64::NAN,
    }
}

/// Normalized price when it is strictly positive.
pub fn derive_valid_price(text: &str) -> Option<f64> {
    let n_value = convert_price_text(text);
    if n_value > 0.0 { Some(n_value) } else { None }
}

/// Validate one row: both prices must normalize to positive numbers.
pub fn derive_valid_row(row_index: usize, row: &SpecSurveyRow) -> Option<SpecValidRow<'_>> {
    Some(SpecValidRow {
        row_index,
        row,
        competitor_price: derive_valid_price(&row.competitor_price)?,
        reference_price: derive_valid_price(&row.reference_price)?,
    })
}

/// Keep only valid rows, preserving source order and indices.
pub fn select_valid_rows(rows: &[SpecSurveyRow]) -> Vec<SpecValidRow<'_>> {
    rows.iter()
        .enumerate()
        .filter_map(|(n_idx, row)| derive_valid_row(n_idx, row))
        .collect()
}
