//! A buffer as the command core sees it: text, caret, selection, marks,
//! folds, and the undo history that scopes every edit.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use core_text::{Buffer, Position, Snapshot, motion};
use tracing::{trace, warn};

use crate::folds::FoldSet;
use crate::undo::{TransactionToken, UndoError, UndoHistory, UndoState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// An open transaction detached from its scope. Insert mode holds one until
/// it exits so the triggering command and the typed text undo together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedTransaction {
    pub buffer: BufferId,
    pub token: TransactionToken,
}

/// Visual selection endpoints. `anchor` is where Visual mode was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

pub struct TextView {
    id: BufferId,
    buffer: Buffer,
    caret: Position,
    selection: Option<Selection>,
    marks: HashMap<char, Position>,
    folds: FoldSet,
    history: UndoHistory,
}

impl TextView {
    pub fn new(id: BufferId, buffer: Buffer) -> Self {
        Self {
            id,
            buffer,
            caret: Position::origin(),
            selection: None,
            marks: HashMap::new(),
            folds: FoldSet::new(),
            history: UndoHistory::new(),
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }
    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }
    pub fn snapshot(&self) -> Snapshot {
        self.buffer.snapshot()
    }
    pub fn text(&self) -> String {
        self.buffer.current().text()
    }
    pub fn history(&self) -> &UndoHistory {
        &self.history
    }
    pub fn folds(&self) -> &FoldSet {
        &self.folds
    }
    pub fn folds_mut(&mut self) -> &mut FoldSet {
        &mut self.folds
    }

    /// Caret re-resolved against the current snapshot.
    pub fn caret(&self) -> Position {
        self.buffer.current().clamp_position(self.caret)
    }

    /// Normal-mode placement: the caret rests on a character, never past the
    /// last one of a non-empty line.
    pub fn move_caret_to(&mut self, pos: Position) {
        let mut p = pos;
        motion::normalize_normal_mode_position(self.buffer.current(), &mut p);
        trace!(target: "state.caret", from_line = self.caret.line, from_byte = self.caret.byte, line = p.line, byte = p.byte, "caret_move");
        self.caret = p;
    }

    /// Placement that may rest one past the line end (insert mode, virtual edit).
    pub fn move_caret_to_virtual(&mut self, pos: Position) {
        let p = self.buffer.current().clamp_position(pos);
        trace!(target: "state.caret", line = p.line, byte = p.byte, "caret_move_virtual");
        self.caret = p;
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn set_mark(&mut self, name: char, pos: Position) {
        self.marks.insert(name, pos);
    }
    /// Mark position re-resolved against the current snapshot.
    pub fn mark(&self, name: char) -> Option<Position> {
        self.marks
            .get(&name)
            .map(|p| self.buffer.current().clamp_position(*p))
    }

    fn undo_state(&self) -> UndoState {
        UndoState {
            snapshot: self.buffer.snapshot(),
            caret: self.caret(),
        }
    }

    /// Open a transaction not bound to a borrow of the view. Prefer
    /// [`TextView::undo_scope`] unless the frame must span several calls.
    pub fn begin_transaction(&mut self, name: &str) -> TransactionToken {
        let before = self.undo_state();
        self.history.begin(name, before)
    }

    pub fn complete_transaction(&mut self, token: TransactionToken) -> Result<bool, UndoError> {
        let after = self.undo_state();
        self.history.complete(token, after)
    }

    /// Close `token` and anything still open above it.
    pub fn complete_transaction_through(&mut self, token: TransactionToken) -> Result<bool, UndoError> {
        let after = self.undo_state();
        self.history.complete_through(token, after)
    }

    pub fn undo_scope(&mut self, name: &str) -> UndoScope<'_> {
        let token = self.begin_transaction(name);
        UndoScope {
            view: self,
            token: Some(token),
        }
    }

    /// Undo up to `count` entries. Returns how many were undone.
    pub fn undo(&mut self, count: usize) -> Result<usize, UndoError> {
        let mut done = 0;
        while done < count.max(1) {
            let Some(entry) = self.history.undo()? else {
                break;
            };
            self.buffer.restore(&entry.before.snapshot);
            self.move_caret_to(entry.before.caret);
            done += 1;
        }
        Ok(done)
    }

    pub fn redo(&mut self, count: usize) -> Result<usize, UndoError> {
        let mut done = 0;
        while done < count.max(1) {
            let Some(entry) = self.history.redo()? else {
                break;
            };
            self.buffer.restore(&entry.after.snapshot);
            self.move_caret_to(entry.after.caret);
            done += 1;
        }
        Ok(done)
    }
}

/// Open transaction over a view. Dereferences to the view so edits and caret
/// moves happen through the scope.
///
/// `complete` records the caret at that moment as the redo position. A scope
/// dropped without completing (an early `?` return) still closes its frame;
/// edits already applied stay and are recorded.
pub struct UndoScope<'a> {
    view: &'a mut TextView,
    token: Option<TransactionToken>,
}

impl UndoScope<'_> {
    pub fn complete(mut self) -> Result<bool, UndoError> {
        match self.token.take() {
            Some(token) => self.view.complete_transaction(token),
            None => Ok(false),
        }
    }

    /// Keep the frame open past this scope.
    pub fn into_linked(mut self) -> LinkedTransaction {
        let buffer = self.view.id;
        let token = match self.token.take() {
            Some(token) => token,
            None => self.view.begin_transaction("linked"),
        };
        LinkedTransaction { buffer, token }
    }
}

impl Deref for UndoScope<'_> {
    type Target = TextView;
    fn deref(&self) -> &TextView {
        &*self.view
    }
}

impl DerefMut for UndoScope<'_> {
    fn deref_mut(&mut self) -> &mut TextView {
        &mut *self.view
    }
}

impl Drop for UndoScope<'_> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            warn!(target: "state.undo", id = token.id(), "undo_scope_dropped_uncompleted");
            if let Err(e) = self.view.complete_transaction_through(token) {
                warn!(target: "state.undo", error = %e, "undo_scope_close_failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_text::Span;
    use pretty_assertions::assert_eq;

    fn view(text: &str) -> TextView {
        TextView::new(BufferId(1), Buffer::from_str("t", text).unwrap())
    }

    #[test]
    fn scope_groups_edits_and_restores_caret() {
        let mut v = view("hello world");
        v.move_caret_to(Position::new(0, 6));
        {
            let mut scope = v.undo_scope("delete word");
            scope.buffer_mut().delete(Span::new(6, 11));
            scope.buffer_mut().insert(6, "there");
            scope.move_caret_to(Position::new(0, 10));
            scope.complete().unwrap();
        }
        assert_eq!(v.text(), "hello there");
        assert_eq!(v.undo(1).unwrap(), 1);
        assert_eq!(v.text(), "hello world");
        assert_eq!(v.caret(), Position::new(0, 6));
        assert_eq!(v.redo(1).unwrap(), 1);
        assert_eq!(v.text(), "hello there");
        assert_eq!(v.caret(), Position::new(0, 10));
    }

    #[test]
    fn dropped_scope_still_closes_frame() {
        let mut v = view("abc");
        {
            let mut scope = v.undo_scope("x");
            scope.buffer_mut().delete(Span::new(0, 1));
        }
        assert_eq!(v.history().open_depth(), 0);
        assert_eq!(v.history().undo_depth(), 1);
        v.undo(1).unwrap();
        assert_eq!(v.text(), "abc");
    }

    #[test]
    fn linked_scope_stays_open_until_completed() {
        let mut v = view("abc");
        let linked = {
            let mut scope = v.undo_scope("insert");
            scope.buffer_mut().insert(0, "x");
            scope.into_linked()
        };
        assert_eq!(v.history().open_depth(), 1);
        v.buffer_mut().insert(1, "y");
        v.complete_transaction(linked.token).unwrap();
        assert_eq!(v.text(), "xyabc");
        v.undo(1).unwrap();
        assert_eq!(v.text(), "abc");
    }

    #[test]
    fn caret_placement_modes() {
        let mut v = view("abc\n");
        v.move_caret_to(Position::new(0, 3));
        assert_eq!(v.caret(), Position::new(0, 2));
        v.move_caret_to_virtual(Position::new(0, 3));
        assert_eq!(v.caret(), Position::new(0, 3));
        v.move_caret_to(Position::new(1, 0));
        assert_eq!(v.caret(), Position::new(1, 0));
    }

    #[test]
    fn marks_are_reresolved() {
        let mut v = view("abcdef");
        v.set_mark('a', Position::new(0, 5));
        v.buffer_mut().delete(Span::new(0, 4));
        assert_eq!(v.mark('a'), Some(Position::new(0, 2)));
        assert_eq!(v.mark('b'), None);
    }
}
