//! Shared helpers: ratio math, Brazilian-Real display and table assembly.

use std::collections::BTreeSet;

use polars::prelude::{Column, DataFrame};
use pricekit_io_xlsx::{EnumCellValue, EnumColumnFormat};

use crate::spec::{SpecSummaryTable, SurveyError};

////////////////////////////////////////////////////////////////////////////////
// #region RatioMath

/// `numerator / denominator * 100`, or `0` when the denominator is zero.
pub fn derive_ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let n_ratio = numerator / denominator * 100.0;
    if n_ratio.is_finite() { n_ratio } else { 0.0 }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DisplayFormatting

/// Render a money amount as `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let n_cents = (value.abs() * 100.0).round() as u64;
    let c_int = group_thousands(n_cents / 100);
    let c_sign = if value < 0.0 && n_cents > 0 { "-" } else { "" };
    format!("{c_sign}R$ {c_int},{:02}", n_cents % 100)
}

/// Render a whole percentage as `83,33%`.
pub fn format_percent_br(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    format!("{value:.2}%").replace('.', ",")
}

fn group_thousands(n_value: u64) -> String {
    let c_digits = n_value.to_string();
    let mut c_out = String::with_capacity(c_digits.len() + c_digits.len() / 3);
    for (n_idx, chr) in c_digits.chars().enumerate() {
        if n_idx > 0 && (c_digits.len() - n_idx) % 3 == 0 {
            c_out.push('.');
        }
        c_out.push(chr);
    }
    c_out
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TableAssembly

/// Row-major draft of a summary table, turned into a DataFrame by [`Self::build`].
pub(crate) struct SpecTableDraft {
    header_grid: Vec<Vec<String>>,
    n_cols_index: usize,
    fmts_by_col: Vec<EnumColumnFormat>,
    rows: Vec<Vec<EnumCellValue>>,
}

impl SpecTableDraft {
    /// Start a draft with `index_labels` as leading label columns and
    /// `n_levels` header rows.
    pub(crate) fn new(index_labels: &[&str], n_levels: usize) -> Self {
        let n_levels = usize::max(1, n_levels);
        let mut header_grid = vec![Vec::new(); n_levels];
        for c_label in index_labels {
            for level in header_grid.iter_mut() {
                level.push(c_label.to_string());
            }
        }
        Self {
            header_grid,
            n_cols_index: index_labels.len(),
            fmts_by_col: vec![EnumColumnFormat::Label; index_labels.len()],
            rows: Vec::new(),
        }
    }

    /// Add a data column. `levels` is padded with the deepest label when short.
    pub(crate) fn push_column(&mut self, levels: &[&str], fmt: EnumColumnFormat) {
        let n_levels = self.header_grid.len();
        for (n_idx_level, level) in self.header_grid.iter_mut().enumerate() {
            let c_label = levels
                .get(n_idx_level)
                .or_else(|| levels.last())
                .copied()
                .unwrap_or_default();
            level.push(c_label.to_string());
        }
        debug_assert!(levels.len() <= n_levels);
        self.fmts_by_col.push(fmt);
    }

    /// Append one row; its length must equal the number of columns.
    pub(crate) fn push_row(&mut self, cells: Vec<EnumCellValue>) {
        debug_assert_eq!(cells.len(), self.fmts_by_col.len());
        self.rows.push(cells);
    }

    pub(crate) fn build(self) -> Result<SpecSummaryTable, SurveyError> {
        let n_width = self.fmts_by_col.len();
        let mut set_names = BTreeSet::new();
        let mut l_columns = Vec::with_capacity(n_width);

        for n_idx_col in 0..n_width {
            let l_levels: Vec<&str> = self
                .header_grid
                .iter()
                .map(|level| level[n_idx_col].as_str())
                .collect();
            let mut c_name = if l_levels.iter().all(|c| *c == l_levels[0]) {
                l_levels[0].to_string()
            } else {
                l_levels.join("|")
            };
            if !set_names.insert(c_name.clone()) {
                c_name = format!("{c_name}#{n_idx_col}");
                set_names.insert(c_name.clone());
            }

            let l_cells = self.rows.iter().map(|row| &row[n_idx_col]);
            let if_all_numeric = self
                .rows
                .iter()
                .all(|row| !matches!(row[n_idx_col], EnumCellValue::String(_)));

            let column = if if_all_numeric {
                let l_values: Vec<Option<f64>> = l_cells
                    .map(|cell| match cell {
                        EnumCellValue::Number(n) => Some(*n),
                        _ => None,
                    })
                    .collect();
                Column::new(c_name.as_str().into(), l_values)
            } else {
                let l_values: Vec<Option<String>> = l_cells
                    .map(|cell| match cell {
                        EnumCellValue::Number(n) => Some(n.to_string()),
                        EnumCellValue::String(s) => Some(s.clone()),
                        EnumCellValue::None => None,
                    })
                    .collect();
                Column::new(c_name.as_str().into(), l_values)
            };
            l_columns.push(column);
        }

        Ok(SpecSummaryTable {
            df: DataFrame::new(l_columns)?,
            header_grid: self.header_grid,
            n_cols_index: self.n_cols_index,
            fmts_by_col: self.fmts_by_col,
        })
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
