use super::entry::HistoryEntry;

pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Undo/redo list with a cursor on the most recently applied entry.
///
/// `cursor == None` is the "before the first entry" position. Entries after
/// the cursor are the redo side and are cut away by the next `push`.
/// No locking happens here; the coordinator owns synchronisation.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
    max_entries: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::with_capacity_limit(DEFAULT_MAX_HISTORY)
    }

    pub fn with_capacity_limit(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.next_index() < self.entries.len()
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|idx| self.entries.get(idx))
    }

    /// Records `entry` right after the cursor, discarding the redo side.
    pub fn push(&mut self, entry: HistoryEntry) {
        let next = self.next_index();
        self.entries.truncate(next);
        self.entries.push(entry);
        self.cursor = Some(next);
        self.trim();
    }

    pub fn advance(&mut self) {
        debug_assert!(self.can_redo(), "advance past the last entry");
        if self.can_redo() {
            self.cursor = Some(self.next_index());
        }
    }

    pub fn retreat(&mut self) {
        debug_assert!(self.can_undo(), "retreat before the first entry");
        self.cursor = match self.cursor {
            Some(0) | None => None,
            Some(idx) => Some(idx - 1),
        };
    }

    /// Swaps the payload of the entry under the cursor, keeping its position.
    pub fn replace_current(&mut self, entry: HistoryEntry) {
        if let Some(current) = self.cursor.and_then(|idx| self.entries.get_mut(idx)) {
            current.modify_from(entry);
        }
    }

    /// Drops the redo side, then `entry` itself. With `adjust_cursor` the
    /// cursor also steps back one position.
    ///
    /// Without `adjust_cursor` the cursor is left one past the end when the
    /// removed entry was the current one; the caller retreats afterwards.
    pub fn remove(&mut self, entry: &HistoryEntry, adjust_cursor: bool) {
        self.entries.truncate(self.next_index());
        if let Some(idx) = self.entries.iter().rposition(|e| e == entry) {
            self.entries.remove(idx);
        }
        if adjust_cursor {
            self.retreat();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    fn next_index(&self) -> usize {
        self.cursor.map_or(0, |idx| idx + 1)
    }

    fn trim(&mut self) {
        let overflow = self.entries.len().saturating_sub(self.max_entries);
        if overflow == 0 {
            return;
        }
        self.entries.drain(..overflow);
        self.cursor = self.cursor.and_then(|idx| idx.checked_sub(overflow));
    }
}
