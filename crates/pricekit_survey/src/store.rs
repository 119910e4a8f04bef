//! Record store contract, sheet addressing and an in-memory store.

use crate::conf::{N_SHEET_COL_COMPETITOR_PRICE, N_SHEET_COL_NOTE, N_SHEET_ROW_OFFSET};
use crate::spec::{SpecCellUpdate, SpecSurveyRow, SurveyError};

/// Backing table of survey rows.
///
/// Rows are addressed by their 0-based position; only the price and note of
/// a row can change.
pub trait RecordStore {
    /// Read every row in source order.
    fn fetch_all_rows(&self) -> Result<Vec<SpecSurveyRow>, SurveyError>;

    /// Overwrite the competitor price text and note of one row.
    fn update_row(
        &mut self,
        row_index: usize,
        competitor_price_text: &str,
        note_text: &str,
    ) -> Result<(), SurveyError>;
}

/// Cell writes that persist one row edit in a spreadsheet with a header row.
pub fn plan_row_update(
    row_index: usize,
    competitor_price_text: &str,
    note_text: &str,
) -> [SpecCellUpdate; 2] {
    let n_row = row_index + N_SHEET_ROW_OFFSET;
    [
        SpecCellUpdate {
            row: n_row,
            col: N_SHEET_COL_COMPETITOR_PRICE,
            value: competitor_price_text.to_string(),
        },
        SpecCellUpdate {
            row: n_row,
            col: N_SHEET_COL_NOTE,
            value: note_text.to_string(),
        },
    ]
}

/// Record store held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    rows: Vec<SpecSurveyRow>,
    /// Cell writes applied so far, in order.
    writes: Vec<SpecCellUpdate>,
    if_reject_writes: bool,
}

impl InMemoryRecordStore {
    pub fn new(rows: Vec<SpecSurveyRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Load from a positional grid of cells (header row excluded).
    pub fn from_grid<R, S>(grid: &[R]) -> Self
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        Self::new(
            grid.iter()
                .map(|cells| SpecSurveyRow::from_cells(cells.as_ref()))
                .collect(),
        )
    }

    /// Make every following `update_row` fail, as an unreachable backend would.
    pub fn set_reject_writes(&mut self, if_reject: bool) {
        self.if_reject_writes = if_reject;
    }

    pub fn rows(&self) -> &[SpecSurveyRow] {
        &self.rows
    }

    pub fn writes(&self) -> &[SpecCellUpdate] {
        &self.writes
    }
}

impl RecordStore for InMemoryRecordStore {
    fn fetch_all_rows(&self) -> Result<Vec<SpecSurveyRow>, SurveyError> {
        Ok(self.rows.clone())
    }

    fn update_row(
        &mut self,
        row_index: usize,
        competitor_price_text: &str,
        note_text: &str,
    ) -> Result<(), SurveyError> {
        let n_rows = self.rows.len();
        if self.if_reject_writes {
            log::warn!("rejected update of row {row_index}");
            return Err(SurveyError::StoreRejected(
                "store is not accepting writes".to_string(),
            ));
        }
        let Some(row) = self.rows.get_mut(row_index) else {
            return Err(SurveyError::RowIndexOutOfRange { row_index, n_rows });
        };
        row.competitor_price = competitor_price_text.to_string();
        row.note = note_text.to_string();
        self.writes
            .extend(plan_row_update(row_index, competitor_price_text, note_text));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_store(n_rows: usize) -> InMemoryRecordStore {
        let grid: Vec<Vec<String>> = (0..n_rows)
            .map(|n_idx| {
                vec![
                    "A".to_string(),
                    "X".to_string(),
                    format!("P{n_idx}"),
                    String::new(),
                    String::new(),
                    "C1".to_string(),
                    "10,00".to_string(),
                ]
            })
            .collect();
        InMemoryRecordStore::from_grid(&grid)
    }

    #[test]
    fn test_plan_row_update_addresses_price_and_note_cells() {
        let l_updates = plan_row_update(5, "12.50", "checked");
        assert_eq!(
            l_updates,
            [
                SpecCellUpdate {
                    row: 7,
                    col: 4,
                    value: "12.50".to_string()
                },
                SpecCellUpdate {
                    row: 7,
                    col: 5,
                    value: "checked".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_update_row_changes_only_price_and_note() {
        let mut store = create_store(8);
        let before = store.fetch_all_rows().expect("rows");

        store.update_row(5, "12.50", "checked").expect("update");

        let after = store.fetch_all_rows().expect("rows");
        assert_eq!(after.len(), before.len());
        assert_eq!(after[5].competitor_price, "12.50");
        assert_eq!(after[5].note, "checked");
        assert_eq!(after[5].product, before[5].product);
        assert_eq!(after[5].reference_price, before[5].reference_price);
        for n_idx in (0..8).filter(|n| *n != 5) {
            assert_eq!(after[n_idx], before[n_idx]);
        }
        assert_eq!(store.writes(), plan_row_update(5, "12.50", "checked").as_slice());
    }

    #[test]
    fn test_update_row_out_of_range() {
        let mut store = create_store(2);
        let err = store.update_row(2, "1", "").expect_err("out of range");
        assert!(matches!(
            err,
            SurveyError::RowIndexOutOfRange {
                row_index: 2,
                n_rows: 2
            }
        ));
    }

    #[test]
    fn test_rejected_write_leaves_rows_untouched() {
        let mut store = create_store(2);
        store.set_reject_writes(true);
        let err = store.update_row(0, "1", "n").expect_err("rejected");
        assert!(matches!(err, SurveyError::StoreRejected(_)));
        assert_eq!(store.rows()[0].competitor_price, "");
        assert!(store.writes().is_empty());
    }
}
