use core_events::NotationError;
use core_state::{BufferId, UndoError};
use core_text::EditError;
use thiserror::Error;

use crate::host::HostError;

/// Failure of a single command.
///
/// Silent errors are signalled with a beep; the rest are shown to the user
/// through the status reporter. Either way the command yields
/// `CommandResult::Error`.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("motion failed")]
    MotionFailed,
    #[error("not enough lines to join")]
    JoinCount,
    #[error("count extends past the end of the line")]
    PastLineEnd,
    #[error("caret is at the start of the line")]
    AtLineStart,
    #[error("nothing to repeat")]
    NothingToRepeat,
    #[error("not recording a macro")]
    NotRecording,
    #[error("E20: Mark not set")]
    MarkNotSet(char),
    #[error("E191: Argument must be a letter or forward/backward quote")]
    InvalidMark(char),
    #[error("E354: Invalid register name: '{0}'")]
    InvalidRegister(char),
    #[error("E353: Nothing in register {0}")]
    EmptyRegister(char),
    #[error("E748: No previously used register")]
    NoPreviousMacro,
    #[error("cannot repeat the repeat command")]
    RecursiveRepeat,
    #[error("macro stopped at a failing key")]
    MacroAborted,
    #[error("E169: Command too recursive")]
    MacroTooDeep,
    #[error("already recording into register {0}")]
    AlreadyRecording(char),
    #[error("Already at oldest change")]
    OldestChange,
    #[error("Already at newest change")]
    NewestChange,
    #[error("invalid macro contents: {0}")]
    Notation(#[from] NotationError),
    #[error(transparent)]
    Undo(#[from] UndoError),
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("no buffer {0:?}")]
    MissingBuffer(BufferId),
}

impl CommandError {
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            CommandError::MotionFailed
                | CommandError::JoinCount
                | CommandError::PastLineEnd
                | CommandError::AtLineStart
                | CommandError::NothingToRepeat
                | CommandError::NotRecording
                | CommandError::MacroAborted
        )
    }
}
