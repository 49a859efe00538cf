//! Insert-mode text entry.
//!
//! `InsertSession` lives between an insert-entering command and `<Esc>`. It
//! applies typed text at the caret, accumulates the `TextChange` the repeat
//! engine replays, and on exit completes the transaction the entering command
//! left open so the command and the text undo together.

use core_state::{LinkedTransaction, TextView, UndoError};
use core_text::{Position, Span, grapheme};
use tracing::{trace, warn};

use crate::command::ModeArgument;
use crate::session::{Session, TextChange};

/// Insert `text` at the caret and leave the caret after it.
pub fn insert_text(view: &mut TextView, text: &str) {
    let snap = view.snapshot();
    let offset = snap.offset(view.caret());
    let after = view.buffer_mut().insert(offset, text);
    view.move_caret_to_virtual(after.position(offset + text.len()));
}

/// Delete up to `count` characters before the caret, crossing line breaks.
/// Returns how many were removed.
pub fn delete_left(view: &mut TextView, count: usize) -> usize {
    let snap = view.snapshot();
    let end = snap.offset(view.caret());
    let mut start = end;
    let mut removed = 0;
    while removed < count && start > 0 {
        start = snap.prev_char_offset(start);
        removed += 1;
    }
    if removed > 0 {
        let after = view.buffer_mut().delete(Span::new(start, end));
        view.move_caret_to_virtual(after.position(start));
    }
    removed
}

/// Delete up to `count` characters after the caret.
pub fn delete_right(view: &mut TextView, count: usize) -> usize {
    let snap = view.snapshot();
    let start = snap.offset(view.caret());
    let mut end = start;
    let mut removed = 0;
    while removed < count && end < snap.len() {
        end = snap.next_char_offset(end);
        removed += 1;
    }
    if removed > 0 {
        let after = view.buffer_mut().delete(Span::new(start, end));
        view.move_caret_to_virtual(after.position(start));
    }
    removed
}

/// Apply one captured change at the caret.
pub fn apply_text_change(view: &mut TextView, change: &TextChange) {
    for leaf in change.flatten() {
        match leaf {
            TextChange::Insert(text) => insert_text(view, text),
            TextChange::DeleteLeft(n) => {
                delete_left(view, *n);
            }
            TextChange::DeleteRight(n) => {
                delete_right(view, *n);
            }
            TextChange::Combination(..) => {}
        }
    }
}

/// Caret shift applied when insert mode ends: one grapheme left, never
/// past the line start.
pub fn caret_left_on_exit(view: &mut TextView) {
    let caret = view.caret();
    if caret.byte == 0 {
        view.move_caret_to(caret);
        return;
    }
    let content = view.snapshot().line(caret.line);
    let byte = grapheme::prev_boundary(&content, caret.byte);
    view.move_caret_to(Position::new(caret.line, byte));
}

pub struct InsertSession {
    transaction: LinkedTransaction,
    change: Option<TextChange>,
}

impl InsertSession {
    /// Adopt the transaction carried by the mode switch, or open one.
    pub fn begin(view: &mut TextView, argument: Option<ModeArgument>) -> Self {
        let transaction = match argument {
            Some(ModeArgument::InsertWithTransaction(linked)) => linked,
            None => LinkedTransaction {
                buffer: view.id(),
                token: view.begin_transaction("insert"),
            },
        };
        trace!(target: "actions.dispatch", token = transaction.token.id(), "insert_begin");
        Self {
            transaction,
            change: None,
        }
    }

    pub fn transaction(&self) -> LinkedTransaction {
        self.transaction
    }

    fn push(&mut self, change: TextChange) {
        self.change = Some(match self.change.take() {
            Some(prev) => prev.combine(change),
            None => change,
        });
    }

    pub fn type_text(&mut self, view: &mut TextView, text: &str) {
        insert_text(view, text);
        self.push(TextChange::Insert(text.to_string()));
    }

    pub fn backspace(&mut self, view: &mut TextView) -> bool {
        let removed = delete_left(view, 1);
        if removed > 0 {
            self.push(TextChange::DeleteLeft(removed));
        }
        removed > 0
    }

    pub fn delete(&mut self, view: &mut TextView) -> bool {
        let removed = delete_right(view, 1);
        if removed > 0 {
            self.push(TextChange::DeleteRight(removed));
        }
        removed > 0
    }

    /// Leave insert mode: close the transaction, hand the typed change to
    /// the session, and step the caret back.
    pub fn finish(self, view: &mut TextView, session: &mut Session) -> Result<(), UndoError> {
        if view.id() != self.transaction.buffer {
            warn!(target: "actions.dispatch", "insert_finished_in_other_buffer");
        }
        caret_left_on_exit(view);
        if view.history().is_open(self.transaction.token) {
            view.complete_transaction_through(self.transaction.token)?;
        }
        if let Some(change) = self.change {
            session.record_text_change(change);
        }
        Ok(())
    }
}
