//! Stateless helper utilities used by the XLSX writer kernel.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL, TUP_LABEL_HINTS_CURRENCY,
    TUP_LABEL_HINTS_PERCENT,
};
use crate::spec::{EnumCellValue, EnumColumnFormat, SpecSheetMerge};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Normalize one cell value for the target column format.
///
/// Missing, `NaN`, `Inf` and (in numeric columns) unparseable text all become
/// [`EnumCellValue::None`], which the writer renders as an empty cell.
/// Percent values above `thr_percent_whole` are divided by 100.
pub fn convert_cell_value(
    value: &EnumCellValue,
    fmt_kind: EnumColumnFormat,
    thr_percent_whole: f64,
) -> EnumCellValue {
    let if_is_numeric_col = matches!(
        fmt_kind,
        EnumColumnFormat::Integer | EnumColumnFormat::Currency | EnumColumnFormat::Percent
    );

    let n_value = match value {
        EnumCellValue::None => return EnumCellValue::None,
        EnumCellValue::Number(n) => *n,
        EnumCellValue::String(s) => {
            if !if_is_numeric_col {
                return EnumCellValue::String(s.clone());
            }
            match s.trim().parse::<f64>() {
                Ok(v) => v,
                Err(_) => return EnumCellValue::None,
            }
        }
    };

    if !n_value.is_finite() {
        return EnumCellValue::None;
    }
    if fmt_kind == EnumColumnFormat::Percent && n_value > thr_percent_whole {
        return EnumCellValue::Number(n_value / 100.0);
    }
    EnumCellValue::Number(n_value)
}

/// Choose a column format from its deepest header label.
///
/// Fallback for tables that arrive without an explicit per-column format list.
pub fn derive_format_from_label(label: &str) -> EnumColumnFormat {
    let c_label = label.to_lowercase();
    if TUP_LABEL_HINTS_PERCENT
        .iter()
        .any(|hint| c_label.contains(hint))
    {
        return EnumColumnFormat::Percent;
    }
    if TUP_LABEL_HINTS_CURRENCY
        .iter()
        .any(|hint| c_label.contains(hint))
    {
        return EnumColumnFormat::Currency;
    }
    EnumColumnFormat::Text
}

/// Estimate displayed width units for a text value.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = String::with_capacity(name.len());
    for chr in name.chars() {
        if TUP_EXCEL_ILLEGAL.contains(&chr) {
            c_name.push_str(replace_to);
        } else {
            c_name.push(chr);
        }
    }
    let mut c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name
        .chars()
        .take(N_LEN_EXCEL_SHEET_NAME_MAX)
        .collect::<String>()
        .trim_end()
        .to_string()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HeaderMergeUtils

/// Plan merges for a one- or two-level header grid.
///
/// The first `n_cols_index` columns are row-label columns: each label is
/// merged vertically across all header rows. In the remaining columns, runs of
/// equal non-empty text are merged horizontally on every header row except the
/// deepest one, which stays one label per column.
pub fn plan_header_merges(header_grid: &[Vec<String>], n_cols_index: usize) -> Vec<SpecSheetMerge> {
    let mut l_merges = Vec::new();
    let Some(v_header_row_0) = header_grid.first() else {
        return l_merges;
    };

    let n_rows = header_grid.len();
    let n_cols = v_header_row_0.len();
    let n_cols_index = usize::min(n_cols_index, n_cols);

    debug_assert!(
        header_grid.iter().all(|_row| _row.len() == n_cols),
        "All rows must have the same number of columns."
    );

    if n_rows > 1 {
        for n_idx_col in 0..n_cols_index {
            l_merges.push(SpecSheetMerge {
                row_idx_start: 0,
                row_idx_end: n_rows - 1,
                col_idx_start: n_idx_col,
                col_idx_end: n_idx_col,
                text: v_header_row_0[n_idx_col].clone(),
            });
        }
    }

    for (_idx_row, v_str_current_row) in header_grid.iter().enumerate().take(n_rows - 1) {
        let mut n_col_idx = n_cols_index;
        while n_col_idx < n_cols {
            let c_cell_val = &v_str_current_row[n_col_idx];
            if c_cell_val.is_empty() {
                n_col_idx += 1;
                continue;
            }

            let mut n_col_idx_end = n_col_idx + 1;
            while n_col_idx_end < n_cols && v_str_current_row[n_col_idx_end] == *c_cell_val {
                n_col_idx_end += 1;
            }

            if n_col_idx_end - n_col_idx > 1 {
                l_merges.push(SpecSheetMerge {
                    row_idx_start: _idx_row,
                    row_idx_end: _idx_row,
                    col_idx_start: n_col_idx,
                    col_idx_end: n_col_idx_end - 1,
                    text: c_cell_val.clone(),
                });
            }
            n_col_idx = n_col_idx_end;
        }
    }

    l_merges
}

/// Build lookup set for cells covered by a merge (excluding the anchor cell).
pub fn derive_merge_tracker(merges: &[SpecSheetMerge]) -> BTreeSet<(usize, usize)> {
    let mut set_merged_cells = BTreeSet::new();
    for merge in merges {
        for row_idx in merge.row_idx_start..=merge.row_idx_end {
            for col_idx in merge.col_idx_start..=merge.col_idx_end {
                if row_idx == merge.row_idx_start && col_idx == merge.col_idx_start {
                    continue;
                }
                set_merged_cells.insert((row_idx, col_idx));
            }
        }
    }
    set_merged_cells
}

/// Group merges by anchor row for row-wise writing.
pub fn group_merges_by_row(merges: &[SpecSheetMerge]) -> BTreeMap<usize, Vec<SpecSheetMerge>> {
    let mut dict_merges_by_row: BTreeMap<usize, Vec<SpecSheetMerge>> = BTreeMap::new();
    for merge in merges {
        dict_merges_by_row
            .entry(merge.row_idx_start)
            .or_default()
            .push(merge.clone());
    }
    dict_merges_by_row
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_sanitize_sheet_name_strips_and_truncates() {
        assert_eq!(sanitize_sheet_name("Store/Buyer*Totals", ""), "StoreBuyerTotals");
        assert_eq!(sanitize_sheet_name("a\\b", "_"), "a_b");
        assert_eq!(sanitize_sheet_name("  ", ""), "Sheet");

        let c_long = "Competitiveness by Competitor and Store";
        let c_out = sanitize_sheet_name(c_long, "");
        assert!(c_out.chars().count() <= N_LEN_EXCEL_SHEET_NAME_MAX);
        assert!(c_long.starts_with(&c_out));
    }

    #[test]
    fn test_sanitize_sheet_name_is_stable_on_clean_names() {
        let c_once = sanitize_sheet_name("Products [Mean]: all?", "");
        assert_eq!(c_once, "Products Mean all");
        assert_eq!(sanitize_sheet_name(&c_once, ""), c_once);
    }

    #[test]
    fn test_plan_header_merges_two_levels_with_index() {
        let header = grid(&[
            &["Buyer", "A - C1", "A - C1", "B - C1", "B - C2"],
            &["Buyer", "Found", "Lower", "Found", "Found"],
        ]);

        let merges = plan_header_merges(&header, 1);
        assert_eq!(
            merges,
            vec![
                SpecSheetMerge {
                    row_idx_start: 0,
                    row_idx_end: 1,
                    col_idx_start: 0,
                    col_idx_end: 0,
                    text: "Buyer".to_string(),
                },
                SpecSheetMerge {
                    row_idx_start: 0,
                    row_idx_end: 0,
                    col_idx_start: 1,
                    col_idx_end: 2,
                    text: "A - C1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_plan_header_merges_bottom_row_stays_plain() {
        let header = grid(&[&["Store", "Found", "Found"]]);
        assert!(plan_header_merges(&header, 1).is_empty());
    }

    #[test]
    fn test_derive_merge_tracker_excludes_anchor() {
        let merges = vec![SpecSheetMerge {
            row_idx_start: 0,
            row_idx_end: 1,
            col_idx_start: 0,
            col_idx_end: 1,
            text: "x".to_string(),
        }];
        let tracker = derive_merge_tracker(&merges);
        assert!(!tracker.contains(&(0, 0)));
        assert!(tracker.contains(&(0, 1)));
        assert!(tracker.contains(&(1, 0)));
        assert!(tracker.contains(&(1, 1)));
    }

    #[test]
    fn test_convert_cell_value_percent_threshold() {
        let thr = crate::conf::THR_PERCENT_WHOLE;
        assert_eq!(
            convert_cell_value(&EnumCellValue::Number(50.0), EnumColumnFormat::Percent, thr),
            EnumCellValue::Number(0.5)
        );
        assert_eq!(
            convert_cell_value(&EnumCellValue::Number(0.25), EnumColumnFormat::Percent, thr),
            EnumCellValue::Number(0.25)
        );
        // 1.5 sits in the ambiguous band and is left untouched.
        assert_eq!(
            convert_cell_value(&EnumCellValue::Number(1.5), EnumColumnFormat::Percent, thr),
            EnumCellValue::Number(1.5)
        );
    }

    #[test]
    fn test_convert_cell_value_missing_and_non_finite_become_blank() {
        for value in [
            EnumCellValue::None,
            EnumCellValue::Number(f64::NAN),
            EnumCellValue::Number(f64::INFINITY),
            EnumCellValue::String("n/a".to_string()),
        ] {
            assert_eq!(
                convert_cell_value(&value, EnumColumnFormat::Currency, 2.0),
                EnumCellValue::None
            );
        }
        assert_eq!(
            convert_cell_value(
                &EnumCellValue::String("n/a".to_string()),
                EnumColumnFormat::Text,
                2.0
            ),
            EnumCellValue::String("n/a".to_string())
        );
    }

    #[test]
    fn test_derive_format_from_label() {
        assert_eq!(derive_format_from_label("%Lower"), EnumColumnFormat::Percent);
        assert_eq!(
            derive_format_from_label("Competitiveness%"),
            EnumColumnFormat::Percent
        );
        assert_eq!(
            derive_format_from_label("Price Comparison"),
            EnumColumnFormat::Percent
        );
        assert_eq!(derive_format_from_label("SumReference"), EnumColumnFormat::Currency);
        assert_eq!(derive_format_from_label("Mean Competitor"), EnumColumnFormat::Currency);
        assert_eq!(derive_format_from_label("Found"), EnumColumnFormat::Text);
    }
}
