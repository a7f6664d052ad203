use std::collections::VecDeque;

use log::debug;
use serde_derive::{Deserialize, Serialize};

use crate::{
    error::Result,
    events::{Emitter, Observer},
    Error, TransactionLogConfig,
};

/// Identifier of a committed entry.
///
/// Identifiers are unique within one log and never reused, not even after
/// the entry has been evicted or the log has been reset.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// Events emitted by a [`TransactionLog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogEvent {
    Commit(EntryId),
    Advance(EntryId),
    Rollback(EntryId),
    Reset,
    Done,
}

#[derive(Debug)]
struct Entry<T> {
    id: EntryId,
    value: T,
}

/// A committed value together with its current position in the log.
#[derive(Debug, PartialEq, Eq)]
pub struct Commit<'a, T> {
    pub id: EntryId,
    pub value: &'a T,
    pub position: usize,
}

/// Bounded history of committed values with a cursor for undo and redo.
///
/// [`TransactionLog::rollback`] moves the cursor to older entries and
/// [`TransactionLog::advance`] moves it forward again. Committing a new value
/// while the cursor is not at the newest entry discards all entries after
/// the cursor.
pub struct TransactionLog<T> {
    entries: VecDeque<Entry<T>>,
    cursor: Option<usize>,
    max_entries: Option<usize>,
    next_id: u64,
    events: Emitter<LogEvent>,
}

impl<T> Default for TransactionLog<T> {
    fn default() -> Self {
        TransactionLog {
            entries: VecDeque::new(),
            cursor: None,
            max_entries: None,
            next_id: 0,
            events: Emitter::default(),
        }
    }
}

impl<T> std::fmt::Debug for TransactionLog<T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionLog")
            .field("entries", &self.entries)
            .field("cursor", &self.cursor)
            .field("max_entries", &self.max_entries)
            .finish()
    }
}

impl<T> TransactionLog<T> {
    /// Create an unbounded log.
    pub fn new() -> TransactionLog<T> {
        TransactionLog::default()
    }

    pub fn with_config(config: TransactionLogConfig) -> Result<TransactionLog<T>> {
        if let Some(max_entries) = config.max_entries {
            if max_entries == 0 {
                return Err(Error::InvalidCapacity(max_entries));
            }
        }
        Ok(TransactionLog {
            max_entries: config.max_entries,
            ..TransactionLog::default()
        })
    }

    /// Register an observer for the events of this log.
    pub fn on<O>(&mut self, observer: O)
    where
        O: Observer<LogEvent> + 'static,
    {
        self.events.on(observer);
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a new value and move the cursor to it.
    ///
    /// Entries after the cursor are discarded first. If the log is bounded,
    /// the oldest entries are evicted until it fits again.
    pub fn commit(&mut self, value: T) -> EntryId {
        self.flush();

        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push_back(Entry { id, value });
        self.cursor = Some(self.entries.len() - 1);
        self.events.emit(&LogEvent::Commit(id));

        if let Some(max_entries) = self.max_entries {
            while self.entries.len() > max_entries {
                if let Some(evicted) = self.entries.pop_front() {
                    debug!("evicted log entry {:?}", evicted.id);
                }
                self.cursor = self.cursor.map(|c| c.saturating_sub(1));
            }
        }
        id
    }

    /// Move the cursor up to `steps` entries forward, stopping at the newest entry.
    ///
    /// Returns the entry the cursor points to afterwards.
    pub fn advance(&mut self, steps: usize) -> Option<EntryId> {
        let cursor = self.cursor?;
        let target = cursor.saturating_add(steps).min(self.entries.len() - 1);
        self.move_cursor(cursor, target, LogEvent::Advance)
    }

    /// Move the cursor up to `steps` entries backward, stopping at the oldest entry.
    ///
    /// Returns the entry the cursor points to afterwards.
    pub fn rollback(&mut self, steps: usize) -> Option<EntryId> {
        let cursor = self.cursor?;
        let target = cursor.saturating_sub(steps);
        self.move_cursor(cursor, target, LogEvent::Rollback)
    }

    fn move_cursor(
        &mut self,
        from: usize,
        to: usize,
        event: fn(EntryId) -> LogEvent,
    ) -> Option<EntryId> {
        let id = self.entries[to].id;
        if from != to {
            self.cursor = Some(to);
            self.events.emit(&event(id));
        }
        Some(id)
    }

    /// Returns the entry with the given ID or the entry at the cursor.
    pub fn get_commit(&self, id: Option<EntryId>) -> Option<Commit<'_, T>> {
        let position = match id {
            Some(id) => self.commit_index(id)?,
            None => self.cursor?,
        };
        let entry = &self.entries[position];
        Some(Commit {
            id: entry.id,
            value: &entry.value,
            position,
        })
    }

    /// Position of the entry with the given ID.
    pub fn commit_index(&self, id: EntryId) -> Option<usize> {
        // IDs are increasing, so the entries are sorted by them
        let (front, back) = self.entries.as_slices();
        if let Ok(i) = front.binary_search_by_key(&id, |e| e.id) {
            Some(i)
        } else {
            back.binary_search_by_key(&id, |e| e.id)
                .ok()
                .map(|i| i + front.len())
        }
    }

    /// Value of the entry at the cursor.
    pub fn current_value(&self) -> Option<&T> {
        self.cursor.map(|c| &self.entries[c].value)
    }

    /// ID of the entry at the cursor.
    pub fn cursor(&self) -> Option<EntryId> {
        self.cursor.map(|c| self.entries[c].id)
    }

    /// Zero-based position of the cursor.
    pub fn cursor_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Delete all entries after the cursor. The cursor is not moved.
    pub fn flush(&mut self) {
        if let Some(cursor) = self.cursor {
            let discarded = self.entries.len() - cursor - 1;
            if discarded > 0 {
                debug!("discarding {} log entries after the cursor", discarded);
                self.entries.truncate(cursor + 1);
            }
        }
    }

    /// Remove all entries.
    pub fn reset(&mut self) {
        debug!("resetting log with {} entries", self.entries.len());
        self.entries.clear();
        self.cursor = None;
        self.events.emit(&LogEvent::Reset);
        self.events.emit(&LogEvent::Done);
    }

    /// Iterate over the committed values from the oldest to the newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|e| &e.value)
    }
}

impl<T> TransactionLog<T>
where
    T: Clone,
{
    /// Copy of all committed values from the oldest to the newest.
    pub fn log(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests;
