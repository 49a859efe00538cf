//! Command model: the decoded Normal / Visual commands the executor runs,
//! their operands, and the results handed back to the mode dispatcher.

use core_events::KeyInput;
use core_state::{LinkedTransaction, ModeKind, RegisterName};

use crate::motion::Motion;

/// Count and register operands shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandData {
    pub count: Option<usize>,
    pub register: Option<RegisterName>,
}

impl CommandData {
    pub fn with_count(count: usize) -> Self {
        Self {
            count: Some(count),
            register: None,
        }
    }

    pub fn count_or_default(&self) -> usize {
        self.count.unwrap_or(1).max(1)
    }

    pub fn register_name(&self) -> RegisterName {
        self.register.unwrap_or(RegisterName::Unnamed)
    }

    /// Replace the count when `count` is given, otherwise keep the original.
    pub fn override_count(self, count: Option<usize>) -> Self {
        Self {
            count: count.or(self.count),
            ..self
        }
    }
}

bitflags::bitflags! {
    /// How a command interacts with the last-command slot.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct CommandFlags: u8 {
        /// Pure caret movement; leaves the slot alone.
        const MOVEMENT         = 0b0001;
        /// Leaves the slot alone (yank, undo, macros, ...).
        const SPECIAL          = 0b0010;
        /// Stored as the new last command.
        const REPEATABLE       = 0b0100;
        /// The insert-mode text that follows is linked onto it.
        const LINKED_WITH_NEXT = 0b1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `J`: drop the next line's indent and add one space.
    RemoveEmptySpaces,
    /// `gJ`: concatenate as is.
    KeepEmptySpaces,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCharacterKind {
    ToggleCase,
    ToUpperCase,
    ToLowerCase,
    Rot13,
}

impl ChangeCharacterKind {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::ToggleCase => text
                .chars()
                .flat_map(|c| {
                    if c.is_uppercase() {
                        c.to_lowercase().collect::<Vec<_>>()
                    } else {
                        c.to_uppercase().collect::<Vec<_>>()
                    }
                })
                .collect(),
            Self::ToUpperCase => text.to_uppercase(),
            Self::ToLowerCase => text.to_lowercase(),
            Self::Rot13 => text
                .chars()
                .map(|c| match c {
                    'a'..='z' => (((c as u8 - b'a') + 13) % 26 + b'a') as char,
                    'A'..='Z' => (((c as u8 - b'A') + 13) % 26 + b'A') as char,
                    _ => c,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalCommand {
    DeleteMotion(Motion),
    DeleteLines,
    DeleteTillEndOfLine,
    DeleteCharacterAtCaret,
    DeleteCharacterBeforeCaret,
    ChangeMotion(Motion),
    ChangeLines,
    ChangeTillEndOfLine,
    SubstituteCharacterAtCaret,
    Yank(Motion),
    YankLines,
    PutAfterCaret { move_caret_after_text: bool },
    PutBeforeCaret { move_caret_after_text: bool },
    PutAfterCaretWithIndent,
    PutBeforeCaretWithIndent,
    JoinLines(JoinKind),
    ReplaceChar(KeyInput),
    ShiftLinesLeft,
    ShiftLinesRight,
    ShiftMotionLinesLeft(Motion),
    ShiftMotionLinesRight(Motion),
    ChangeCaseCaretPoint(ChangeCharacterKind),
    ChangeCaseMotion(ChangeCharacterKind, Motion),
    InsertAtCaret,
    InsertAfterCaret,
    InsertAtEndOfLine,
    InsertAtFirstNonBlank,
    InsertLineAbove,
    InsertLineBelow,
    Undo,
    Redo,
    RepeatLastCommand,
    RecordMacroStart(char),
    RecordMacroStop,
    /// `@` replays the last macro run.
    RunMacro(char),
    SetMarkToCaret(char),
    JumpToMark(char),
    JumpToMarkLine(char),
    MoveCaretToMotion(Motion),
    SwitchMode(ModeKind),
    FoldLines,
    FoldMotion(Motion),
    OpenFoldUnderCaret,
    CloseFoldUnderCaret,
    OpenAllFoldsUnderCaret,
    CloseAllFoldsUnderCaret,
    DeleteFoldUnderCaret,
    DeleteAllFoldsUnderCaret,
    DeleteAllFoldsInBuffer,
    WriteBufferAndQuit,
    CloseBuffer,
    SplitViewHorizontally,
    SplitViewVertically,
}

impl NormalCommand {
    pub fn flags(&self) -> CommandFlags {
        use NormalCommand::*;
        let linked = CommandFlags::REPEATABLE | CommandFlags::LINKED_WITH_NEXT;
        match self {
            DeleteMotion(_)
            | DeleteLines
            | DeleteTillEndOfLine
            | DeleteCharacterAtCaret
            | DeleteCharacterBeforeCaret
            | PutAfterCaret { .. }
            | PutBeforeCaret { .. }
            | PutAfterCaretWithIndent
            | PutBeforeCaretWithIndent
            | JoinLines(_)
            | ReplaceChar(_)
            | ShiftLinesLeft
            | ShiftLinesRight
            | ShiftMotionLinesLeft(_)
            | ShiftMotionLinesRight(_)
            | ChangeCaseCaretPoint(_)
            | ChangeCaseMotion(..) => CommandFlags::REPEATABLE,
            ChangeMotion(_)
            | ChangeLines
            | ChangeTillEndOfLine
            | SubstituteCharacterAtCaret
            | InsertAtCaret
            | InsertAfterCaret
            | InsertAtEndOfLine
            | InsertAtFirstNonBlank
            | InsertLineAbove
            | InsertLineBelow => linked,
            Yank(_)
            | YankLines
            | Undo
            | Redo
            | RepeatLastCommand
            | RecordMacroStart(_)
            | RecordMacroStop
            | RunMacro(_)
            | SetMarkToCaret(_)
            | SwitchMode(_)
            | OpenFoldUnderCaret
            | CloseFoldUnderCaret
            | OpenAllFoldsUnderCaret
            | CloseAllFoldsUnderCaret
            | WriteBufferAndQuit
            | CloseBuffer
            | SplitViewHorizontally
            | SplitViewVertically => CommandFlags::SPECIAL,
            JumpToMark(_) | JumpToMarkLine(_) | MoveCaretToMotion(_) => CommandFlags::MOVEMENT,
            FoldLines
            | FoldMotion(_)
            | DeleteFoldUnderCaret
            | DeleteAllFoldsUnderCaret
            | DeleteAllFoldsInBuffer => CommandFlags::empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualCommand {
    DeleteSelection,
    DeleteLineSelection,
    ChangeSelection,
    ChangeLineSelection,
    YankSelection,
    YankLineSelection,
    PutOverSelection { move_caret_after_text: bool },
    JoinSelection(JoinKind),
    ReplaceSelection(KeyInput),
    ShiftLinesLeft,
    ShiftLinesRight,
    ChangeCase(ChangeCharacterKind),
    FoldSelection,
    DeleteAllFoldsInSelection,
}

impl VisualCommand {
    pub fn flags(&self) -> CommandFlags {
        use VisualCommand::*;
        match self {
            DeleteSelection
            | DeleteLineSelection
            | PutOverSelection { .. }
            | JoinSelection(_)
            | ReplaceSelection(_)
            | ShiftLinesLeft
            | ShiftLinesRight
            | ChangeCase(_) => CommandFlags::REPEATABLE,
            ChangeSelection | ChangeLineSelection => {
                CommandFlags::REPEATABLE | CommandFlags::LINKED_WITH_NEXT
            }
            YankSelection | YankLineSelection => CommandFlags::SPECIAL,
            FoldSelection | DeleteAllFoldsInSelection => CommandFlags::empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    NormalCommand(NormalCommand, CommandData),
    VisualCommand(VisualCommand, CommandData, crate::visual::VisualSpan),
}

/// Extra payload for a mode switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArgument {
    /// Insert mode entered with the command's transaction still open; insert
    /// mode completes it on exit.
    InsertWithTransaction(LinkedTransaction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSwitch {
    NoSwitch,
    SwitchMode(ModeKind),
    SwitchModeWithArgument(ModeKind, ModeArgument),
    SwitchPreviousMode,
}

impl ModeSwitch {
    pub fn linked_transaction(&self) -> Option<LinkedTransaction> {
        match self {
            ModeSwitch::SwitchModeWithArgument(_, ModeArgument::InsertWithTransaction(linked)) => {
                Some(*linked)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Completed(ModeSwitch),
    Error,
}

impl CommandResult {
    pub fn is_error(&self) -> bool {
        matches!(self, CommandResult::Error)
    }
}
