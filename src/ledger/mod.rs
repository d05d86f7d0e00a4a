pub mod model;
pub mod summary;

use crate::error::LedgerError;
use crate::ledger::model::{AssessmentRecord, Category, EntryForm, Hotel, NewEntry};
use crate::ledger::summary::{Summary, summarize};
use crate::store::LedgerStore;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Ordered assessment rows. Insertion order is display and export order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    records: Vec<AssessmentRecord>,
}

impl Ledger {
    pub fn from_records(records: Vec<AssessmentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AssessmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, entry: NewEntry, date_added: NaiveDate) -> Result<(), LedgerError> {
        let entry = validate(entry)?;
        self.records
            .push(AssessmentRecord::from_entry(entry, date_added));
        Ok(())
    }

    /// Swaps in an edited table without validating it. Returns whether any
    /// field of any row actually differs.
    pub fn replace(&mut self, records: Vec<AssessmentRecord>) -> bool {
        if self.records == records {
            return false;
        }

        self.records = records;
        true
    }

    /// Folds an edited copy of the `selected` view back into the full table.
    /// Rows of hidden hotels keep their positions; edited rows fill the
    /// visible slots in order, surplus rows go to the end and visible slots
    /// left over are dropped.
    pub fn merge_view(
        &self,
        selected: &BTreeSet<Hotel>,
        edited: Vec<AssessmentRecord>,
    ) -> Vec<AssessmentRecord> {
        let mut edited = edited.into_iter();
        let mut merged = self
            .records
            .iter()
            .filter_map(|record| {
                if selected.contains(&record.hotel_name) {
                    edited.next()
                } else {
                    Some(record.clone())
                }
            })
            .collect::<Vec<_>>();
        merged.extend(edited);
        merged
    }

    pub fn pop(&mut self) -> Option<AssessmentRecord> {
        self.records.pop()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn filter_by_hotel(&self, selected: &BTreeSet<Hotel>) -> Vec<AssessmentRecord> {
        self.records
            .iter()
            .filter(|record| selected.contains(&record.hotel_name))
            .cloned()
            .collect()
    }
}

fn validate(mut entry: NewEntry) -> Result<NewEntry, LedgerError> {
    let trimmed = entry.area_name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation {
            field: "area_name",
            reason: "cannot be empty".into(),
        });
    }
    if trimmed.len() != entry.area_name.len() {
        entry.area_name = trimmed.to_string();
    }

    // NaN fails this comparison too.
    if !(entry.coverage_sqm > 0.0) {
        return Err(LedgerError::Validation {
            field: "coverage_sqm",
            reason: format!("must be greater than 0, got {}", entry.coverage_sqm),
        });
    }

    Ok(entry)
}

/// Signal returned by every mutating operation. The caller re-renders only
/// when `changed` is set.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mutation {
    pub changed: bool,
}

impl Mutation {
    pub const CHANGED: Mutation = Mutation { changed: true };
    pub const UNCHANGED: Mutation = Mutation { changed: false };
}

/// One refresh cycle's filtered records together with the aggregates derived
/// from them. Display, summary and export all consume the same `View`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct View {
    pub hotels: Vec<Hotel>,
    pub records: Vec<AssessmentRecord>,
    pub summary: Summary,
}

/// Per-session state: the ledger, entry defaults, the hotel filter and the
/// optional snapshot file.
#[derive(Debug)]
pub struct Session {
    ledger: Ledger,
    last_category: Category,
    hotel_filter: BTreeSet<Hotel>,
    store: Option<LedgerStore>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            ledger: Ledger::default(),
            last_category: Category::default(),
            hotel_filter: Hotel::ALL.into_iter().collect(),
            store: None,
        }
    }

    pub fn with_store(store: LedgerStore) -> Self {
        let ledger = store.load();
        info!(path = %store.path().display(), count = ledger.len(), "session opened");

        Self {
            last_category: ledger
                .records()
                .last()
                .map(|record| record.category)
                .unwrap_or_default(),
            ledger,
            store: Some(store),
            ..Self::new()
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn store(&self) -> Option<&LedgerStore> {
        self.store.as_ref()
    }

    pub fn default_category(&self) -> Category {
        self.last_category
    }

    pub fn hotel_filter(&self) -> &BTreeSet<Hotel> {
        &self.hotel_filter
    }

    pub fn set_hotel_filter(&mut self, hotels: impl IntoIterator<Item = Hotel>) {
        self.hotel_filter = hotels.into_iter().collect();
    }

    pub fn new_form(&self) -> EntryForm {
        EntryForm {
            category: self.last_category,
            ..EntryForm::default()
        }
    }

    pub fn append(&mut self, entry: NewEntry) -> Result<Mutation, LedgerError> {
        self.append_on(entry, Local::now().date_naive())
    }

    fn append_on(&mut self, entry: NewEntry, date: NaiveDate) -> Result<Mutation, LedgerError> {
        let category = entry.category;
        self.ledger.append(entry, date)?;
        self.last_category = category;

        info!(count = self.ledger.len(), category = %category, "assessment row added");
        self.persist();
        Ok(Mutation::CHANGED)
    }

    /// Appends the form's contents; on success the per-entry fields are
    /// cleared. On failure the form is left intact for correction.
    pub fn submit(&mut self, form: &mut EntryForm) -> Result<Mutation, LedgerError> {
        let mutation = self.append(form.to_entry())?;
        form.clear_after_submit(self.last_category);
        Ok(mutation)
    }

    /// `table` is an edited copy of the current view. Rows hidden by the
    /// hotel filter are kept untouched.
    pub fn edit_in_place(&mut self, table: Vec<AssessmentRecord>) -> Mutation {
        let merged = self.ledger.merge_view(&self.hotel_filter, table);
        if !self.ledger.replace(merged) {
            debug!("edited table identical to ledger, nothing to refresh");
            return Mutation::UNCHANGED;
        }

        info!(count = self.ledger.len(), "assessment table edited");
        self.persist();
        Mutation::CHANGED
    }

    pub fn undo_last(&mut self) -> Result<Mutation, LedgerError> {
        let removed = self.ledger.pop().ok_or(LedgerError::EmptyUndo)?;

        info!(area = %removed.area_name, count = self.ledger.len(), "last assessment row removed");
        self.persist();
        Ok(Mutation::CHANGED)
    }

    pub fn clear_all(&mut self) -> Result<Mutation> {
        let was_empty = self.ledger.is_empty();

        match &self.store {
            Some(store) => store.reset(&mut self.ledger)?,
            None => self.ledger.clear(),
        }

        info!("assessment cleared");
        Ok(Mutation {
            changed: !was_empty,
        })
    }

    /// Recomputes the filtered view and its aggregates from the current
    /// ledger. Nothing is cached between calls.
    pub fn refresh(&self) -> View {
        let records = self.ledger.filter_by_hotel(&self.hotel_filter);
        let summary = summarize(&records);

        View {
            hotels: self.hotel_filter.iter().copied().collect(),
            records,
            summary,
        }
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };

        if let Err(error) = store.save(&self.ledger) {
            warn!(
                path = %store.path().display(),
                error = %format!("{error:#}"),
                "snapshot write failed; in-memory assessment is ahead of the file"
            );
        }
    }
}
