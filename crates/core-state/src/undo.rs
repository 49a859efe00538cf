use core_text::{Position, Snapshot};
use thiserror::Error;
use tracing::{trace, warn};

/// Maximum number of entries retained in undo history.
pub const UNDO_HISTORY_MAX: usize = 200;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UndoError {
    #[error("transaction {got} completed while {expected} is still open")]
    OutOfOrder { expected: u64, got: u64 },
    #[error("transaction {0} is not open")]
    NotOpen(u64),
    #[error("cannot undo while a transaction is open")]
    TransactionOpen,
}

/// Handle for one open frame of the transaction stack.
///
/// Tokens are plain values so an open frame can outlive the handler that
/// opened it (insert mode carries one until `<Esc>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionToken {
    id: u64,
}

impl TransactionToken {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Text + caret captured at one edge of an undo entry.
#[derive(Debug, Clone)]
pub struct UndoState {
    pub snapshot: Snapshot,
    pub caret: Position,
}

#[derive(Debug, Clone)]
pub struct UndoEntry {
    pub name: String,
    pub before: UndoState,
    pub after: UndoState,
}

#[derive(Debug)]
struct Frame {
    id: u64,
    name: String,
    before: UndoState,
}

/// Per-buffer undo/redo stacks plus the stack of open transactions.
///
/// Only the outermost transaction records an entry; nested frames fold into
/// it, which is what makes a linked pair or a whole macro undo as one unit.
#[derive(Debug, Default)]
pub struct UndoHistory {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
    open: Vec<Frame>,
    next_id: u64,
    skipped: u64,
}

impl UndoHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    /// Number of open (nested) transactions.
    pub fn open_depth(&self) -> usize {
        self.open.len()
    }
    pub fn is_open(&self, token: TransactionToken) -> bool {
        self.open.iter().any(|f| f.id == token.id)
    }
    /// Transactions completed without changing the text.
    pub fn entries_skipped(&self) -> u64 {
        self.skipped
    }
    pub fn last_entry(&self) -> Option<&UndoEntry> {
        self.undo_stack.last()
    }

    pub fn begin(&mut self, name: &str, before: UndoState) -> TransactionToken {
        self.next_id += 1;
        let id = self.next_id;
        trace!(target: "state.undo", id, name, depth = self.open.len() + 1, "transaction_begin");
        self.open.push(Frame {
            id,
            name: name.to_string(),
            before,
        });
        TransactionToken { id }
    }

    /// Close the innermost frame, which must be `token`. Returns true when an
    /// undo entry was recorded.
    pub fn complete(&mut self, token: TransactionToken, after: UndoState) -> Result<bool, UndoError> {
        let Some(top) = self.open.last() else {
            return Err(UndoError::NotOpen(token.id));
        };
        if top.id != token.id {
            if self.is_open(token) {
                return Err(UndoError::OutOfOrder {
                    expected: top.id,
                    got: token.id,
                });
            }
            return Err(UndoError::NotOpen(token.id));
        }
        let frame = self.open.pop().ok_or(UndoError::NotOpen(token.id))?;
        trace!(target: "state.undo", id = frame.id, name = %frame.name, depth = self.open.len(), "transaction_complete");
        if !self.open.is_empty() {
            return Ok(false);
        }
        Ok(self.push_entry(UndoEntry {
            name: frame.name,
            before: frame.before,
            after,
        }))
    }

    /// Close `token` together with every frame opened above it.
    pub fn complete_through(&mut self, token: TransactionToken, after: UndoState) -> Result<bool, UndoError> {
        if !self.is_open(token) {
            return Err(UndoError::NotOpen(token.id));
        }
        let mut recorded = false;
        while let Some(top) = self.open.last() {
            let id = top.id;
            if id != token.id {
                warn!(target: "state.undo", id, closing = token.id, "nested_transaction_force_completed");
            }
            recorded |= self.complete(TransactionToken { id }, after.clone())?;
            if id == token.id {
                break;
            }
        }
        Ok(recorded)
    }

    fn push_entry(&mut self, entry: UndoEntry) -> bool {
        if entry.before.snapshot.same_text(&entry.after.snapshot) {
            self.skipped += 1;
            trace!(target: "state.undo", name = %entry.name, "entry_skipped_unchanged");
            return false;
        }
        self.undo_stack.push(entry);
        if self.undo_stack.len() > UNDO_HISTORY_MAX {
            let _ = self.undo_stack.remove(0);
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
        self.redo_stack.clear();
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), "entry_recorded");
        true
    }

    /// Pop the newest entry for undo; the caller restores `entry.before`.
    pub fn undo(&mut self) -> Result<Option<UndoEntry>, UndoError> {
        if !self.open.is_empty() {
            return Err(UndoError::TransactionOpen);
        }
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(None);
        };
        trace!(target: "state.undo", name = %entry.name, undo_depth = self.undo_stack.len(), "undo_pop");
        self.redo_stack.push(entry.clone());
        Ok(Some(entry))
    }

    /// Pop the newest undone entry; the caller restores `entry.after`.
    pub fn redo(&mut self) -> Result<Option<UndoEntry>, UndoError> {
        if !self.open.is_empty() {
            return Err(UndoError::TransactionOpen);
        }
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(None);
        };
        trace!(target: "state.undo", name = %entry.name, redo_depth = self.redo_stack.len(), "redo_pop");
        self.undo_stack.push(entry.clone());
        Ok(Some(entry))
    }
}
