//! Editor state consumed by the command core: per-buffer views, undo
//! history, registers and folds.
//!
//! Undo model:
//! - Each `TextView` owns an `UndoHistory`. Edits happen inside a
//!   transaction; transactions nest and only the outermost one records an
//!   entry (before/after snapshot + caret), so a linked pair of commands or a
//!   whole macro undoes as one unit.
//! - `UndoScope` is the guard handlers use. Dropping it without `complete`
//!   still closes the frame, keeping the undo stack balanced on early returns.
//! - Snapshots are rope clones, so entries are cheap structural shares rather
//!   than deep copies.
//!
//! Registers are session-wide (`RegisterStore`), views are per buffer.

pub mod folds;
pub mod registers;
pub mod undo;
pub mod view;

pub use folds::{Fold, FoldManager, FoldSet};
pub use registers::{
    OperationKind, Register, RegisterName, RegisterOperation, RegisterStore, RegisterValue,
    StringData,
};
pub use undo::{TransactionToken, UNDO_HISTORY_MAX, UndoEntry, UndoError, UndoHistory, UndoState};
pub use view::{BufferId, LinkedTransaction, Selection, TextView, UndoScope};

/// Editor mode kinds a command can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Normal,
    Insert,
    Replace,
    VisualCharacter,
    VisualLine,
    VisualBlock,
}

impl ModeKind {
    pub fn is_visual(self) -> bool {
        matches!(
            self,
            ModeKind::VisualCharacter | ModeKind::VisualLine | ModeKind::VisualBlock
        )
    }
}
