//! Metric calculators: valid rows in, one summary table out.
//!
//! Every calculator aggregates into [`SpecMetricRecord`]s keyed by group and
//! derives ratios from the aggregated numerators/denominators, so the TOTAL
//! row is exact rather than an average of per-group percentages.

use std::collections::{BTreeMap, BTreeSet};

use pricekit_io_xlsx::{EnumCellValue, EnumColumnFormat};

use crate::conf::{
    C_GROUP_SEPARATOR, C_LABEL_TOTAL, C_METRIC_COMPETITIVENESS, C_METRIC_FOUND, C_METRIC_HIGHER,
    C_METRIC_LOWER, C_METRIC_MEAN_COMPETITOR, C_METRIC_MEAN_REFERENCE, C_METRIC_PCT_HIGHER,
    C_METRIC_PCT_LOWER, C_METRIC_RATIO, C_METRIC_SUM_COMPETITOR, C_METRIC_SUM_REFERENCE,
};
use crate::spec::{
    EnumAggregation, EnumDimension, EnumMatrixMode, EnumValueMode, SpecSummaryTable,
    SpecValidRow, SurveyError,
};
use crate::util::{SpecTableDraft, derive_ratio_percent, format_brl, format_percent_br};

const TUP_COUNT_METRICS: [(&str, EnumColumnFormat); 5] = [
    (C_METRIC_FOUND, EnumColumnFormat::Integer),
    (C_METRIC_LOWER, EnumColumnFormat::Integer),
    (C_METRIC_HIGHER, EnumColumnFormat::Integer),
    (C_METRIC_PCT_LOWER, EnumColumnFormat::Percent),
    (C_METRIC_PCT_HIGHER, EnumColumnFormat::Percent),
];

const TUP_SUM_METRICS: [(&str, EnumColumnFormat); 3] = [
    (C_METRIC_SUM_REFERENCE, EnumColumnFormat::Currency),
    (C_METRIC_SUM_COMPETITOR, EnumColumnFormat::Currency),
    (C_METRIC_COMPETITIVENESS, EnumColumnFormat::Percent),
];

////////////////////////////////////////////////////////////////////////////////
// #region MetricRecord

/// Additive per-cell aggregate; every view reads its columns from this record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpecMetricRecord {
    /// Rows aggregated.
    pub n_found: u64,
    /// Rows where the competitor is cheaper.
    pub n_lower: u64,
    /// Rows where the competitor is more expensive.
    pub n_higher: u64,
    pub sum_reference: f64,
    pub sum_competitor: f64,
}

impl SpecMetricRecord {
    pub fn add_row(&mut self, row: &SpecValidRow<'_>) {
        self.n_found += 1;
        if row.competitor_price < row.reference_price {
            self.n_lower += 1;
        } else if row.competitor_price > row.reference_price {
            self.n_higher += 1;
        }
        self.sum_reference += row.reference_price;
        self.sum_competitor += row.competitor_price;
    }

    pub fn absorb(&mut self, other: &SpecMetricRecord) {
        self.n_found += other.n_found;
        self.n_lower += other.n_lower;
        self.n_higher += other.n_higher;
        self.sum_reference += other.sum_reference;
        self.sum_competitor += other.sum_competitor;
    }

    pub fn pct_lower(&self) -> f64 {
        derive_ratio_percent(self.n_lower as f64, self.n_found as f64)
    }

    pub fn pct_higher(&self) -> f64 {
        derive_ratio_percent(self.n_higher as f64, self.n_found as f64)
    }

    /// Reference sum over competitor sum, as a whole percentage.
    pub fn competitiveness(&self) -> f64 {
        derive_ratio_percent(self.sum_reference, self.sum_competitor)
    }

    pub fn mean_reference(&self) -> f64 {
        if self.n_found == 0 {
            return 0.0;
        }
        self.sum_reference / self.n_found as f64
    }

    pub fn mean_competitor(&self) -> f64 {
        if self.n_found == 0 {
            return 0.0;
        }
        self.sum_competitor / self.n_found as f64
    }

    fn derive_count_cells(&self) -> [EnumCellValue; 5] {
        [
            EnumCellValue::Number(self.n_found as f64),
            EnumCellValue::Number(self.n_lower as f64),
            EnumCellValue::Number(self.n_higher as f64),
            EnumCellValue::Number(self.pct_lower()),
            EnumCellValue::Number(self.pct_higher()),
        ]
    }

    fn derive_sum_cells(&self, value_mode: EnumValueMode) -> [EnumCellValue; 3] {
        match value_mode {
            EnumValueMode::Raw => [
                EnumCellValue::Number(self.sum_reference),
                EnumCellValue::Number(self.sum_competitor),
                EnumCellValue::Number(self.competitiveness()),
            ],
            EnumValueMode::Display => [
                EnumCellValue::String(format_brl(self.sum_reference)),
                EnumCellValue::String(format_brl(self.sum_competitor)),
                EnumCellValue::String(format_percent_br(self.competitiveness())),
            ],
        }
    }

    fn derive_aggregate_cells(&self, aggregation: EnumAggregation) -> [EnumCellValue; 3] {
        let (n_reference, n_competitor) = match aggregation {
            EnumAggregation::Mean => (self.mean_reference(), self.mean_competitor()),
            EnumAggregation::Sum => (self.sum_reference, self.sum_competitor),
        };
        [
            EnumCellValue::Number(n_reference),
            EnumCellValue::Number(n_competitor),
            EnumCellValue::Number(derive_ratio_percent(n_reference, n_competitor)),
        ]
    }
}

/// Aggregate rows per value of `group_by`, plus the grand total.
pub fn aggregate_by(
    rows: &[SpecValidRow<'_>],
    group_by: EnumDimension,
) -> (BTreeMap<String, SpecMetricRecord>, SpecMetricRecord) {
    let mut dict_groups: BTreeMap<String, SpecMetricRecord> = BTreeMap::new();
    let mut rec_total = SpecMetricRecord::default();
    for row in rows {
        dict_groups
            .entry(row.key(group_by).to_string())
            .or_default()
            .add_row(row);
        rec_total.add_row(row);
    }
    (dict_groups, rec_total)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SimpleViews

/// Found / Lower / Higher counts and their percentages per group.
pub fn calculate_comparison_metrics(
    rows: &[SpecValidRow<'_>],
    group_by: EnumDimension,
) -> Result<SpecSummaryTable, SurveyError> {
    let mut draft = SpecTableDraft::new(&[group_by.label()], 1);
    for (c_label, fmt) in TUP_COUNT_METRICS {
        draft.push_column(&[c_label], fmt);
    }
    if rows.is_empty() {
        return draft.build();
    }

    let (dict_groups, rec_total) = aggregate_by(rows, group_by);
    for (c_group, rec) in &dict_groups {
        let mut l_cells = vec![EnumCellValue::String(c_group.clone())];
        l_cells.extend(rec.derive_count_cells());
        draft.push_row(l_cells);
    }
    let mut l_cells = vec![EnumCellValue::String(C_LABEL_TOTAL.to_string())];
    l_cells.extend(rec_total.derive_count_cells());
    draft.push_row(l_cells);

    draft.build()
}

/// Reference/competitor sums and competitiveness per group.
pub fn calculate_competitiveness(
    rows: &[SpecValidRow<'_>],
    group_by: EnumDimension,
    value_mode: EnumValueMode,
) -> Result<SpecSummaryTable, SurveyError> {
    let mut draft = SpecTableDraft::new(&[group_by.label()], 1);
    for (c_label, fmt) in TUP_SUM_METRICS {
        draft.push_column(&[c_label], derive_mode_format(fmt, value_mode));
    }
    if rows.is_empty() {
        return draft.build();
    }

    let (dict_groups, rec_total) = aggregate_by(rows, group_by);
    for (c_group, rec) in &dict_groups {
        let mut l_cells = vec![EnumCellValue::String(c_group.clone())];
        l_cells.extend(rec.derive_sum_cells(value_mode));
        draft.push_row(l_cells);
    }
    let mut l_cells = vec![EnumCellValue::String(C_LABEL_TOTAL.to_string())];
    l_cells.extend(rec_total.derive_sum_cells(value_mode));
    draft.push_row(l_cells);

    draft.build()
}

fn derive_mode_format(fmt: EnumColumnFormat, value_mode: EnumValueMode) -> EnumColumnFormat {
    match value_mode {
        EnumValueMode::Raw => fmt,
        EnumValueMode::Display => EnumColumnFormat::Text,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MatrixView

/// Rows by `row_dimension`, one column group per observed `col_dimensions` pair.
///
/// Pairs never observed for a row are filled with zeros.
pub fn calculate_matrix(
    rows: &[SpecValidRow<'_>],
    row_dimension: EnumDimension,
    col_dimensions: (EnumDimension, EnumDimension),
    mode: EnumMatrixMode,
) -> Result<SpecSummaryTable, SurveyError> {
    let (dim_a, dim_b) = col_dimensions;

    let mut dict_cells: BTreeMap<String, BTreeMap<(String, String), SpecMetricRecord>> =
        BTreeMap::new();
    let mut dict_col_totals: BTreeMap<(String, String), SpecMetricRecord> = BTreeMap::new();
    for row in rows {
        let tup_col_key = (row.key(dim_a).to_string(), row.key(dim_b).to_string());
        dict_cells
            .entry(row.key(row_dimension).to_string())
            .or_default()
            .entry(tup_col_key.clone())
            .or_default()
            .add_row(row);
        dict_col_totals.entry(tup_col_key).or_default().add_row(row);
    }
    let set_col_keys: BTreeSet<&(String, String)> = dict_col_totals.keys().collect();

    let l_metrics: &[(&str, EnumColumnFormat)] = match mode {
        EnumMatrixMode::Count => &TUP_COUNT_METRICS[..],
        EnumMatrixMode::Sum => &TUP_SUM_METRICS[..],
    };
    let derive_cells = |rec: &SpecMetricRecord| -> Vec<EnumCellValue> {
        match mode {
            EnumMatrixMode::Count => rec.derive_count_cells().to_vec(),
            EnumMatrixMode::Sum => rec.derive_sum_cells(EnumValueMode::Raw).to_vec(),
        }
    };

    let mut draft = SpecTableDraft::new(&[row_dimension.label()], 2);
    for c_group in derive_group_labels(&set_col_keys) {
        for (c_label, fmt) in l_metrics {
            draft.push_column(&[c_group.as_str(), *c_label], *fmt);
        }
    }
    if rows.is_empty() {
        return draft.build();
    }

    let rec_zero = SpecMetricRecord::default();
    for (c_row_key, dict_row) in &dict_cells {
        let mut l_cells = vec![EnumCellValue::String(c_row_key.clone())];
        for tup_col_key in &set_col_keys {
            l_cells.extend(derive_cells(dict_row.get(*tup_col_key).unwrap_or(&rec_zero)));
        }
        draft.push_row(l_cells);
    }

    let mut l_cells = vec![EnumCellValue::String(C_LABEL_TOTAL.to_string())];
    for rec in dict_col_totals.values() {
        l_cells.extend(derive_cells(rec));
    }
    draft.push_row(l_cells);

    draft.build()
}

/// Join each key pair into a header label, suffixing `" (n)"` when distinct
/// pairs collapse to the same text (`("A", "B - C")` vs `("A - B", "C")`).
fn derive_group_labels(set_col_keys: &BTreeSet<&(String, String)>) -> Vec<String> {
    let mut set_labels: BTreeSet<String> = BTreeSet::new();
    let mut l_labels = Vec::with_capacity(set_col_keys.len());
    for (c_a, c_b) in set_col_keys {
        let c_base = format!("{c_a}{C_GROUP_SEPARATOR}{c_b}");
        let mut c_label = c_base.clone();
        let mut n_idx = 2usize;
        while set_labels.contains(&c_label) {
            c_label = format!("{c_base} ({n_idx})");
            n_idx += 1;
        }
        set_labels.insert(c_label.clone());
        l_labels.push(c_label);
    }
    l_labels
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ProductCrossTab

/// Rows by (buyer, product), one column group per competitor.
///
/// Each group holds the aggregated reference price, the aggregated competitor
/// price and their ratio. Combinations never observed stay empty.
pub fn calculate_product_crosstab(
    rows: &[SpecValidRow<'_>],
    aggregation: EnumAggregation,
) -> Result<SpecSummaryTable, SurveyError> {
    let mut dict_cells: BTreeMap<(String, String), BTreeMap<String, SpecMetricRecord>> =
        BTreeMap::new();
    let mut dict_competitor_totals: BTreeMap<String, SpecMetricRecord> = BTreeMap::new();
    for row in rows {
        let c_competitor = row.key(EnumDimension::Competitor).to_string();
        dict_cells
            .entry((
                row.key(EnumDimension::Buyer).to_string(),
                row.key(EnumDimension::Product).to_string(),
            ))
            .or_default()
            .entry(c_competitor.clone())
            .or_default()
            .add_row(row);
        dict_competitor_totals
            .entry(c_competitor)
            .or_default()
            .add_row(row);
    }

    let (c_label_reference, c_label_competitor) = match aggregation {
        EnumAggregation::Mean => (C_METRIC_MEAN_REFERENCE, C_METRIC_MEAN_COMPETITOR),
        EnumAggregation::Sum => (C_METRIC_SUM_REFERENCE, C_METRIC_SUM_COMPETITOR),
    };

    let mut draft = SpecTableDraft::new(
        &[EnumDimension::Buyer.label(), EnumDimension::Product.label()],
        2,
    );
    for c_competitor in dict_competitor_totals.keys() {
        let c_group = c_competitor.as_str();
        draft.push_column(&[c_group, c_label_reference], EnumColumnFormat::Currency);
        draft.push_column(&[c_group, c_label_competitor], EnumColumnFormat::Currency);
        draft.push_column(&[c_group, C_METRIC_RATIO], EnumColumnFormat::Percent);
    }
    if rows.is_empty() {
        return draft.build();
    }

    for ((c_buyer, c_product), dict_row) in &dict_cells {
        let mut l_cells = vec![
            EnumCellValue::String(c_buyer.clone()),
            EnumCellValue::String(c_product.clone()),
        ];
        for c_competitor in dict_competitor_totals.keys() {
            match dict_row.get(c_competitor) {
                Some(rec) => l_cells.extend(rec.derive_aggregate_cells(aggregation)),
                None => l_cells.extend(std::iter::repeat_n(EnumCellValue::None, 3)),
            }
        }
        draft.push_row(l_cells);
    }

    let mut l_cells = vec![
        EnumCellValue::String(C_LABEL_TOTAL.to_string()),
        EnumCellValue::String(String::new()),
    ];
    for rec in dict_competitor_totals.values() {
        l_cells.extend(rec.derive_aggregate_cells(aggregation));
    }
    draft.push_row(l_cells);

    draft.build()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::select_valid_rows;
    use crate::spec::SpecSurveyRow;

    fn row(
        store: &str,
        buyer: &str,
        product: &str,
        comp: &str,
        competitor: &str,
        reference: &str,
    ) -> SpecSurveyRow {
        SpecSurveyRow {
            store: store.to_string(),
            buyer: buyer.to_string(),
            product: product.to_string(),
            competitor_price: comp.to_string(),
            note: String::new(),
            competitor: competitor.to_string(),
            reference_price: reference.to_string(),
        }
    }

    fn create_rows() -> Vec<SpecSurveyRow> {
        vec![
            row("A", "X", "P1", "10,00", "C1", "12,00"),
            row("A", "X", "P2", "15,00", "C1", "15,00"),
            row("A", "Y", "P3", "9,00", "C2", "8,00"),
            row("B", "Y", "P3", "7,00", "C1", "8,00"),
            row("B", "Y", "P4", "4,00", "C1", "5,00"),
            row("B", "Y", "P5", "6,00", "C1", "5,00"),
            row("B", "X", "P1", "", "C2", "12,00"),
            row("B", "X", "P2", "abc", "C2", "0"),
        ]
    }

    fn assert_close(value: Option<f64>, expected: f64) {
        let n_value = value.expect("numeric cell");
        assert!(
            (n_value - expected).abs() < 1e-9,
            "expected {expected}, got {n_value}"
        );
    }

    #[test]
    fn test_comparison_single_buyer_scenario() {
        let rows = vec![
            row("A", "X", "P1", "10,00", "C1", "12,00"),
            row("A", "X", "P2", "15,00", "C1", "15,00"),
        ];
        let valid = select_valid_rows(&rows);
        let table = calculate_comparison_metrics(&valid, EnumDimension::Buyer).expect("table");

        assert_eq!(table.height(), 2);
        for c_label in ["X", C_LABEL_TOTAL] {
            let n_row = table.find_row(&[c_label]).expect("row");
            assert_close(table.number(n_row, 1), 2.0);
            assert_close(table.number(n_row, 2), 1.0);
            assert_close(table.number(n_row, 3), 0.0);
            assert_close(table.number(n_row, 4), 50.0);
            assert_close(table.number(n_row, 5), 0.0);
        }
    }

    #[test]
    fn test_comparison_total_is_recomputed_not_averaged() {
        let rows = create_rows();
        let valid = select_valid_rows(&rows);
        let table = calculate_comparison_metrics(&valid, EnumDimension::Buyer).expect("table");

        let n_x = table.find_row(&["X"]).expect("X");
        let n_y = table.find_row(&["Y"]).expect("Y");
        let n_total = table.find_row(&[C_LABEL_TOTAL]).expect("TOTAL");
        assert_eq!(n_total, table.height() - 1);

        assert_close(table.number(n_x, 1), 2.0);
        assert_close(table.number(n_y, 1), 4.0);
        assert_close(table.number(n_y, 2), 2.0);
        assert_close(table.number(n_y, 3), 2.0);

        let n_lower_sum = table.number(n_x, 2).expect("x") + table.number(n_y, 2).expect("y");
        let n_found_sum = table.number(n_x, 1).expect("x") + table.number(n_y, 1).expect("y");
        assert_close(table.number(n_total, 1), 6.0);
        assert_close(table.number(n_total, 4), n_lower_sum / n_found_sum * 100.0);
        assert_close(table.number(n_total, 5), 2.0 / 6.0 * 100.0);
    }

    #[test]
    fn test_invalid_rows_never_contribute() {
        let rows = create_rows();
        let valid = select_valid_rows(&rows);
        let table = calculate_comparison_metrics(&valid, EnumDimension::Store).expect("table");

        let n_b = table.find_row(&["B"]).expect("B");
        assert_close(table.number(n_b, 1), 3.0);

        let table = calculate_competitiveness(&valid, EnumDimension::Store, EnumValueMode::Raw)
            .expect("table");
        let n_b = table.find_row(&["B"]).expect("B");
        assert_close(table.number(n_b, 1), 18.0);
        assert_close(table.number(n_b, 2), 17.0);
    }

    #[test]
    fn test_competitiveness_total_uses_grand_sums() {
        let rows = create_rows();
        let valid = select_valid_rows(&rows);
        let table = calculate_competitiveness(&valid, EnumDimension::Competitor, EnumValueMode::Raw)
            .expect("table");

        assert_eq!(
            table.column_labels(),
            vec![
                "Competitor",
                C_METRIC_SUM_REFERENCE,
                C_METRIC_SUM_COMPETITOR,
                C_METRIC_COMPETITIVENESS
            ]
        );
        let n_c1 = table.find_row(&["C1"]).expect("C1");
        assert_close(table.number(n_c1, 1), 45.0);
        assert_close(table.number(n_c1, 2), 42.0);
        assert_close(table.number(n_c1, 3), 45.0 / 42.0 * 100.0);

        let n_total = table.find_row(&[C_LABEL_TOTAL]).expect("TOTAL");
        assert_close(table.number(n_total, 1), 53.0);
        assert_close(table.number(n_total, 2), 51.0);
        assert_close(table.number(n_total, 3), 53.0 / 51.0 * 100.0);
    }

    #[test]
    fn test_competitiveness_display_mode_renders_strings() {
        let rows = vec![row("A", "X", "P1", "1000,00", "C1", "1500,00")];
        let valid = select_valid_rows(&rows);
        let table = calculate_competitiveness(&valid, EnumDimension::Buyer, EnumValueMode::Display)
            .expect("table");

        assert_eq!(table.text(0, 1).as_deref(), Some("R$ 1.500,00"));
        assert_eq!(table.text(0, 2).as_deref(), Some("R$ 1.000,00"));
        assert_eq!(table.text(0, 3).as_deref(), Some("150,00%"));
        assert!(
            table.fmts_by_col[1..]
                .iter()
                .all(|fmt| *fmt == EnumColumnFormat::Text)
        );
    }

    #[test]
    fn test_empty_input_yields_empty_table() {
        let valid: Vec<SpecValidRow<'_>> = vec![];
        assert!(
            calculate_comparison_metrics(&valid, EnumDimension::Buyer)
                .expect("table")
                .is_empty()
        );
        assert!(
            calculate_competitiveness(&valid, EnumDimension::Store, EnumValueMode::Raw)
                .expect("table")
                .is_empty()
        );
        assert!(
            calculate_matrix(
                &valid,
                EnumDimension::Buyer,
                (EnumDimension::Store, EnumDimension::Competitor),
                EnumMatrixMode::Count,
            )
            .expect("table")
            .is_empty()
        );
        assert!(
            calculate_product_crosstab(&valid, EnumAggregation::Mean)
                .expect("table")
                .is_empty()
        );
    }

    #[test]
    fn test_matrix_fills_missing_pairs_with_zero() {
        let rows = create_rows();
        let valid = select_valid_rows(&rows);
        let table = calculate_matrix(
            &valid,
            EnumDimension::Buyer,
            (EnumDimension::Store, EnumDimension::Competitor),
            EnumMatrixMode::Count,
        )
        .expect("table");

        assert_eq!(table.header_grid.len(), 2);
        assert_eq!(table.n_cols_index, 1);
        // Pairs observed: A-C1, A-C2, B-C1.
        assert_eq!(table.width(), 1 + 3 * TUP_COUNT_METRICS.len());

        let n_x = table.find_row(&["X"]).expect("X");
        let n_col_found = table.find_col(Some("B - C1"), C_METRIC_FOUND).expect("col");
        let n_col_pct = table
            .find_col(Some("B - C1"), C_METRIC_PCT_LOWER)
            .expect("col");
        assert_close(table.number(n_x, n_col_found), 0.0);
        assert_close(table.number(n_x, n_col_pct), 0.0);

        let n_y = table.find_row(&["Y"]).expect("Y");
        assert_close(table.number(n_y, n_col_found), 3.0);
        assert_close(table.number(n_y, n_col_pct), 200.0 / 3.0);

        let n_total = table.find_row(&[C_LABEL_TOTAL]).expect("TOTAL");
        let n_col_found_a1 = table.find_col(Some("A - C1"), C_METRIC_FOUND).expect("col");
        let n_col_pct_a1 = table
            .find_col(Some("A - C1"), C_METRIC_PCT_LOWER)
            .expect("col");
        assert_close(table.number(n_total, n_col_found_a1), 2.0);
        assert_close(table.number(n_total, n_col_pct_a1), 50.0);
    }

    #[test]
    fn test_matrix_group_labels_stay_distinct_when_keys_contain_separator() {
        let rows = vec![
            row("A", "X", "P1", "10,00", "B - C", "12,00"),
            row("A - B", "X", "P2", "15,00", "C", "10,00"),
        ];
        let valid = select_valid_rows(&rows);
        let table = calculate_matrix(
            &valid,
            EnumDimension::Buyer,
            (EnumDimension::Store, EnumDimension::Competitor),
            EnumMatrixMode::Count,
        )
        .expect("table");

        let n_metrics = TUP_COUNT_METRICS.len();
        assert_eq!(table.width(), 1 + 2 * n_metrics);
        assert_eq!(table.header_grid[0][1], "A - B - C");
        assert_eq!(table.header_grid[0][1 + n_metrics], "A - B - C (2)");

        let n_x = table.find_row(&["X"]).expect("X");
        let n_col_lower = table
            .find_col(Some("A - B - C"), C_METRIC_PCT_LOWER)
            .expect("col");
        let n_col_higher = table
            .find_col(Some("A - B - C (2)"), C_METRIC_PCT_LOWER)
            .expect("col");
        assert_close(table.number(n_x, n_col_lower), 100.0);
        assert_close(table.number(n_x, n_col_higher), 0.0);

        let l_spans: Vec<(usize, usize)> =
            pricekit_io_xlsx::plan_header_merges(&table.header_grid, table.n_cols_index)
                .into_iter()
                .filter(|merge| merge.row_idx_start == 0 && merge.col_idx_start > 0)
                .map(|merge| (merge.col_idx_start, merge.col_idx_end))
                .collect();
        assert_eq!(
            l_spans,
            vec![(1, n_metrics), (1 + n_metrics, 2 * n_metrics)]
        );
    }

    #[test]
    fn test_matrix_sum_mode_recomputes_total_ratio() {
        let rows = create_rows();
        let valid = select_valid_rows(&rows);
        let table = calculate_matrix(
            &valid,
            EnumDimension::Buyer,
            (EnumDimension::Store, EnumDimension::Competitor),
            EnumMatrixMode::Sum,
        )
        .expect("table");

        let n_total = table.find_row(&[C_LABEL_TOTAL]).expect("TOTAL");
        let n_col = table
            .find_col(Some("B - C1"), C_METRIC_COMPETITIVENESS)
            .expect("col");
        assert_close(table.number(n_total, n_col), 18.0 / 17.0 * 100.0);

        let n_x = table.find_row(&["X"]).expect("X");
        assert_close(table.number(n_x, n_col), 0.0);
    }

    #[test]
    fn test_product_crosstab_mean_and_missing_cells() {
        let rows = vec![
            row("A", "X", "P1", "10,00", "C1", "12,00"),
            row("B", "X", "P1", "14,00", "C1", "12,00"),
            row("A", "X", "P2", "5,00", "C2", "4,00"),
        ];
        let valid = select_valid_rows(&rows);
        let table = calculate_product_crosstab(&valid, EnumAggregation::Mean).expect("table");

        assert_eq!(table.n_cols_index, 2);
        assert_eq!(table.width(), 2 + 2 * 3);
        assert_eq!(table.header_grid[0][0], "Buyer");
        assert_eq!(table.header_grid[0][1], "Product");

        let n_p1 = table.find_row(&["X", "P1"]).expect("P1");
        let n_col_ref = table
            .find_col(Some("C1"), C_METRIC_MEAN_REFERENCE)
            .expect("col");
        let n_col_comp = table
            .find_col(Some("C1"), C_METRIC_MEAN_COMPETITOR)
            .expect("col");
        let n_col_ratio = table.find_col(Some("C1"), C_METRIC_RATIO).expect("col");
        assert_close(table.number(n_p1, n_col_ref), 12.0);
        assert_close(table.number(n_p1, n_col_comp), 12.0);
        assert_close(table.number(n_p1, n_col_ratio), 100.0);

        let n_col_c2_ref = table
            .find_col(Some("C2"), C_METRIC_MEAN_REFERENCE)
            .expect("col");
        assert_eq!(table.number(n_p1, n_col_c2_ref), None);

        let n_total = table.find_row(&[C_LABEL_TOTAL, ""]).expect("TOTAL");
        assert_close(table.number(n_total, n_col_comp), 12.0);
    }

    #[test]
    fn test_product_crosstab_sum_labels() {
        let rows = vec![
            row("A", "X", "P1", "10,00", "C1", "12,00"),
            row("B", "X", "P1", "14,00", "C1", "12,00"),
        ];
        let valid = select_valid_rows(&rows);
        let table = calculate_product_crosstab(&valid, EnumAggregation::Sum).expect("table");

        let n_p1 = table.find_row(&["X", "P1"]).expect("P1");
        let n_col_ref = table
            .find_col(Some("C1"), C_METRIC_SUM_REFERENCE)
            .expect("col");
        let n_col_ratio = table.find_col(Some("C1"), C_METRIC_RATIO).expect("col");
        assert_close(table.number(n_p1, n_col_ref), 24.0);
        assert_close(table.number(n_p1, n_col_ratio), 100.0);
    }

    #[test]
    fn test_metric_record_zero_denominators() {
        let rec = SpecMetricRecord::default();
        assert_eq!(rec.pct_lower(), 0.0);
        assert_eq!(rec.pct_higher(), 0.0);
        assert_eq!(rec.competitiveness(), 0.0);
        assert_eq!(rec.mean_reference(), 0.0);
        assert_eq!(rec.mean_competitor(), 0.0);
    }
}
