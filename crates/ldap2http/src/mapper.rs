//! Backend entries to search results.

use crate::backend::BackendEntry;
use serde_json::{Map, Value};
use std::iter::FusedIterator;

/// One search result record, carrying the backend's attributes unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEntry(BackendEntry);

impl OutboundEntry {
    /// Borrow the attribute mapping.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        self.0.attributes()
    }

    /// Take the attribute mapping.
    #[must_use]
    pub fn into_attributes(self) -> Map<String, Value> {
        self.0.into_attributes()
    }
}

impl From<BackendEntry> for OutboundEntry {
    fn from(entry: BackendEntry) -> Self {
        Self(entry)
    }
}

/// Item produced while streaming a result set.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// A result entry.
    Entry(OutboundEntry),
    /// The result set is closed.
    Done,
}

/// Lazy stream over one backend result set.
///
/// Yields every entry in backend order, then exactly one [`SearchEvent::Done`], then
/// nothing. It cannot be restarted.
#[derive(Debug)]
pub struct EntryStream {
    entries: std::vec::IntoIter<BackendEntry>,
    finished: bool,
}

impl EntryStream {
    /// Wrap the decoded backend array.
    #[must_use]
    pub fn new(entries: Vec<BackendEntry>) -> Self {
        Self {
            entries: entries.into_iter(),
            finished: false,
        }
    }
}

impl Iterator for EntryStream {
    type Item = SearchEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.entries.next() {
            Some(entry) => Some(SearchEvent::Entry(entry.into())),
            None => {
                self.finished = true;
                Some(SearchEvent::Done)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = if self.finished {
            0
        } else {
            self.entries.len() + 1
        };
        (left, Some(left))
    }
}

impl ExactSizeIterator for EntryStream {}

impl FusedIterator for EntryStream {}
