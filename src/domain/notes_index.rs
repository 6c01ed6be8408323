//! In-memory date → note mapping rebuilt from disk.

use super::{DateKey, DayNote};
use std::collections::BTreeMap;

/// Every note found under a journal root, keyed by day.
///
/// The index is rebuilt wholesale by a crawl. After a single save the
/// caller derives a new index with [`NotesIndex::merged`] rather than
/// mutating the existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesIndex {
    notes: BTreeMap<DateKey, DayNote>,
}

impl NotesIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, key: &DateKey) -> Option<&DayNote> {
        self.notes.get(key)
    }

    pub fn contains(&self, key: &DateKey) -> bool {
        self.notes.contains_key(key)
    }

    /// Inserts a note, returning the previous note for that day.
    pub fn insert(&mut self, key: DateKey, note: DayNote) -> Option<DayNote> {
        self.notes.insert(key, note)
    }

    /// Returns a new index with one day's entry replaced.
    ///
    /// `None` removes the day, used when a re-read after save finds nothing.
    pub fn merged(&self, key: DateKey, note: Option<DayNote>) -> Self {
        let mut next = self.clone();
        match note {
            Some(note) => {
                next.notes.insert(key, note);
            }
            None => {
                next.notes.remove(&key);
            }
        }
        next
    }

    /// Iterates entries in ascending date order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&DateKey, &DayNote)> {
        self.notes.iter()
    }

    /// Returns the non-blank notes of one month (0-based), ascending by day.
    pub fn month(&self, year: i32, month: u32) -> Vec<(DateKey, &DayNote)> {
        self.notes
            .iter()
            .filter(|(k, n)| k.year() == year && k.month() == month && !n.is_blank())
            .map(|(k, n)| (*k, n))
            .collect()
    }

    /// Flattens the index into display order, most recent day first.
    pub fn sorted_descending(&self) -> Vec<(DateKey, &DayNote)> {
        sorted_descending(self)
    }
}

impl FromIterator<(DateKey, DayNote)> for NotesIndex {
    fn from_iter<I: IntoIterator<Item = (DateKey, DayNote)>>(iter: I) -> Self {
        Self {
            notes: iter.into_iter().collect(),
        }
    }
}

/// Orders index entries by full date, strictly descending.
///
/// Comparison is on the structured key (year, then month, then day), never
/// on the directory name strings.
pub fn sorted_descending(index: &NotesIndex) -> Vec<(DateKey, &DayNote)> {
    let mut entries: Vec<(DateKey, &DayNote)> = index.notes.iter().map(|(k, n)| (*k, n)).collect();
    entries.sort_by(|(a, _), (b, _)| b.cmp(a));
    entries
}
