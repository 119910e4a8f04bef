//! Field-staff entry session: filters, cursor and save-and-move navigation.

use crate::conf::C_OPTION_ALL;
use crate::spec::{SpecSurveyRow, SurveyError};
use crate::store::RecordStore;

////////////////////////////////////////////////////////////////////////////////
// #region SessionModels

/// Who is using the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRole {
    /// Browses and edits survey rows.
    FieldStaff,
    /// Views and exports reports.
    Commercial,
}

/// An edit that could not be persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPendingEdit {
    pub row_index: usize,
    pub competitor_price: String,
    pub note: String,
}

/// The row under the cursor, with entry fields prefilled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecEntryView {
    /// Source row index (the update key).
    pub row_index: usize,
    pub row: SpecSurveyRow,
    /// Prefilled price text: the unsaved edit if any, else the stored value.
    pub competitor_price: String,
    /// Prefilled note text.
    pub note: String,
    /// 0-based cursor position in the work list.
    pub position: usize,
    pub n_items: usize,
    /// `Item i of n | Buyer: b`.
    pub caption: String,
}

/// Result of a save-and-move action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumNavOutcome {
    /// Saved and moved to `position`.
    Moved { position: usize },
    /// Saved the last item; the cursor stays.
    EndOfList,
    /// Already at the first item; nothing was saved.
    StartOfList,
    /// The store rejected the edit; it is kept as the pending edit.
    SaveFailed(String),
    /// No rows match the filters.
    NoRows,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FilterOptions

/// `All` followed by every distinct store, in first-seen order.
pub fn derive_store_options(rows: &[SpecSurveyRow]) -> Vec<String> {
    derive_distinct_options(rows.iter().map(|row| row.store.as_str()))
}

/// `All` followed by the distinct buyers of rows in `store_filter`.
pub fn derive_buyer_options(rows: &[SpecSurveyRow], store_filter: &str) -> Vec<String> {
    derive_distinct_options(
        rows.iter()
            .filter(|row| if_option_matches(store_filter, &row.store))
            .map(|row| row.buyer.as_str()),
    )
}

fn derive_distinct_options<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut l_options = vec![C_OPTION_ALL.to_string()];
    for c_value in values {
        if !l_options[1..].iter().any(|c| c == c_value) {
            l_options.push(c_value.to_string());
        }
    }
    l_options
}

fn if_option_matches(option: &str, value: &str) -> bool {
    option == C_OPTION_ALL || option == value
}

/// Source indices of the rows matching both filters, in source order.
pub fn select_work_rows(rows: &[SpecSurveyRow], store_filter: &str, buyer_filter: &str) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            if_option_matches(store_filter, &row.store) && if_option_matches(buyer_filter, &row.buyer)
        })
        .map(|(n_idx, _)| n_idx)
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SessionContext

/// Per-user state of the entry screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    role: Option<EnumRole>,
    store_filter: String,
    buyer_filter: String,
    cursor: usize,
    pending_edit: Option<SpecPendingEdit>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            role: None,
            store_filter: C_OPTION_ALL.to_string(),
            buyer_filter: C_OPTION_ALL.to_string(),
            cursor: 0,
            pending_edit: None,
        }
    }
}

impl SessionContext {
    /// Start a session logged in as `role`.
    pub fn new(role: EnumRole) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn role(&self) -> Option<EnumRole> {
        self.role
    }

    pub fn store_filter(&self) -> &str {
        &self.store_filter
    }

    pub fn buyer_filter(&self) -> &str {
        &self.buyer_filter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn pending_edit(&self) -> Option<&SpecPendingEdit> {
        self.pending_edit.as_ref()
    }

    /// Change role; filters, cursor and pending edit start over.
    pub fn switch_role(&mut self, role: EnumRole) {
        *self = Self::new(role);
    }

    pub fn logout(&mut self) {
        *self = Self::default();
    }

    /// Reports can only be built and exported by the commercial role.
    pub fn ensure_can_export(&self) -> Result<(), SurveyError> {
        match self.role {
            Some(EnumRole::Commercial) => Ok(()),
            _ => Err(SurveyError::PermissionDenied),
        }
    }

    /// Select a store; the buyer filter falls back to `All`.
    pub fn set_store_filter(&mut self, store: &str) {
        if self.store_filter == store {
            return;
        }
        self.store_filter = store.to_string();
        self.buyer_filter = C_OPTION_ALL.to_string();
        self.reset_cursor();
    }

    pub fn set_buyer_filter(&mut self, buyer: &str) {
        if self.buyer_filter == buyer {
            return;
        }
        self.buyer_filter = buyer.to_string();
        self.reset_cursor();
    }

    fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.pending_edit = None;
    }

    /// Work list under the current filters; a cursor past its end goes back to 0.
    fn derive_work_rows(&mut self, rows: &[SpecSurveyRow]) -> Vec<usize> {
        let l_work = select_work_rows(rows, &self.store_filter, &self.buyer_filter);
        if self.cursor >= l_work.len() {
            self.cursor = 0;
        }
        l_work
    }

    /// The row under the cursor, or `None` when no row matches the filters.
    pub fn current(&mut self, rows: &[SpecSurveyRow]) -> Option<SpecEntryView> {
        let l_work = self.derive_work_rows(rows);
        let n_row_index = *l_work.get(self.cursor)?;
        let row = &rows[n_row_index];

        let (c_price, c_note) = match &self.pending_edit {
            Some(edit) if edit.row_index == n_row_index => {
                (edit.competitor_price.clone(), edit.note.clone())
            }
            _ => (row.competitor_price.clone(), row.note.clone()),
        };
        Some(SpecEntryView {
            row_index: n_row_index,
            row: row.clone(),
            competitor_price: c_price,
            note: c_note,
            position: self.cursor,
            n_items: l_work.len(),
            caption: format!(
                "Item {} of {} | Buyer: {}",
                self.cursor + 1,
                l_work.len(),
                row.buyer
            ),
        })
    }

    /// Persist the edit of the current row, then move forward.
    pub fn save_and_next<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        competitor_price_text: &str,
        note_text: &str,
    ) -> Result<EnumNavOutcome, SurveyError> {
        let rows = store.fetch_all_rows()?;
        let l_work = self.derive_work_rows(&rows);
        let Some(&n_row_index) = l_work.get(self.cursor) else {
            return Ok(EnumNavOutcome::NoRows);
        };

        if let Some(outcome) = self.persist(store, n_row_index, competitor_price_text, note_text) {
            return Ok(outcome);
        }
        if self.cursor + 1 < l_work.len() {
            self.cursor += 1;
            Ok(EnumNavOutcome::Moved {
                position: self.cursor,
            })
        } else {
            Ok(EnumNavOutcome::EndOfList)
        }
    }

    /// Persist the edit of the current row, then move back.
    ///
    /// At the first item nothing is saved.
    pub fn save_and_prev<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        competitor_price_text: &str,
        note_text: &str,
    ) -> Result<EnumNavOutcome, SurveyError> {
        let rows = store.fetch_all_rows()?;
        let l_work = self.derive_work_rows(&rows);
        let Some(&n_row_index) = l_work.get(self.cursor) else {
            return Ok(EnumNavOutcome::NoRows);
        };
        if self.cursor == 0 {
            return Ok(EnumNavOutcome::StartOfList);
        }

        if let Some(outcome) = self.persist(store, n_row_index, competitor_price_text, note_text) {
            return Ok(outcome);
        }
        self.cursor -= 1;
        Ok(EnumNavOutcome::Moved {
            position: self.cursor,
        })
    }

    /// Write one row; on failure keep the edit pending and return the outcome to report.
    fn persist<S: RecordStore + ?Sized>(
        &mut self,
        store: &mut S,
        row_index: usize,
        competitor_price_text: &str,
        note_text: &str,
    ) -> Option<EnumNavOutcome> {
        match store.update_row(row_index, competitor_price_text, note_text) {
            Ok(()) => {
                self.pending_edit = None;
                None
            }
            Err(err) => {
                log::warn!("row {row_index} not saved: {err}");
                self.pending_edit = Some(SpecPendingEdit {
                    row_index,
                    competitor_price: competitor_price_text.to_string(),
                    note: note_text.to_string(),
                });
                Some(EnumNavOutcome::SaveFailed(err.to_string()))
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
