//! Session-wide state shared by every buffer: registers, the last-command
//! slot, the repeat guard, and macro recording.

use std::cell::Cell;
use std::rc::Rc;

use core_events::KeyInput;
use core_state::{RegisterName, RegisterStore};
use tracing::{debug, trace};

use crate::command::{CommandData, CommandFlags, NormalCommand, VisualCommand};
use crate::error::CommandError;
use crate::visual::StoredVisualSpan;

/// Literal insert-mode edit captured for repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextChange {
    Insert(String),
    /// Characters removed before the caret.
    DeleteLeft(usize),
    /// Characters removed after the caret.
    DeleteRight(usize),
    Combination(Box<TextChange>, Box<TextChange>),
}

impl TextChange {
    /// Append `next`, merging into the simpler forms where possible.
    pub fn combine(self, next: TextChange) -> TextChange {
        match (self, next) {
            (TextChange::Insert(mut a), TextChange::Insert(b)) => {
                a.push_str(&b);
                TextChange::Insert(a)
            }
            (TextChange::Insert(mut a), TextChange::DeleteLeft(n)) if n <= a.chars().count() => {
                for _ in 0..n {
                    a.pop();
                }
                TextChange::Insert(a)
            }
            (TextChange::DeleteLeft(a), TextChange::DeleteLeft(b)) => TextChange::DeleteLeft(a + b),
            (TextChange::DeleteRight(a), TextChange::DeleteRight(b)) => {
                TextChange::DeleteRight(a + b)
            }
            (a, b) => TextChange::Combination(Box::new(a), Box::new(b)),
        }
    }

    /// Leaf edits in application order.
    pub fn flatten(&self) -> Vec<&TextChange> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(change) = stack.pop() {
            match change {
                TextChange::Combination(a, b) => {
                    stack.push(b);
                    stack.push(a);
                }
                leaf => out.push(leaf),
            }
        }
        out
    }
}

/// A replayable recipe for the last change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredCommand {
    NormalCommand {
        command: NormalCommand,
        data: CommandData,
    },
    VisualCommand {
        command: VisualCommand,
        data: CommandData,
        span: StoredVisualSpan,
    },
    TextChangeCommand(TextChange),
    LinkedCommand(Box<StoredCommand>, Box<StoredCommand>),
}

impl StoredCommand {
    pub fn flags(&self) -> CommandFlags {
        match self {
            StoredCommand::NormalCommand { command, .. } => command.flags(),
            StoredCommand::VisualCommand { command, .. } => command.flags(),
            StoredCommand::TextChangeCommand(_) => CommandFlags::REPEATABLE,
            StoredCommand::LinkedCommand(_, second) => second.flags(),
        }
    }

    /// Non-linked commands in execution order, without recursion.
    pub fn leaves(&self) -> Vec<&StoredCommand> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(cmd) = stack.pop() {
            match cmd {
                StoredCommand::LinkedCommand(first, second) => {
                    stack.push(second);
                    stack.push(first);
                }
                leaf => out.push(leaf),
            }
        }
        out
    }
}

/// Resets the in-repeat flag when dropped.
pub struct RepeatGuard {
    flag: Rc<Cell<bool>>,
}

impl Drop for RepeatGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[derive(Debug, Clone)]
struct MacroRecording {
    register: RegisterName,
    keys: Vec<KeyInput>,
}

#[derive(Default)]
pub struct Session {
    pub registers: RegisterStore,
    last_command: Option<StoredCommand>,
    in_repeat: Rc<Cell<bool>>,
    recording: Option<MacroRecording>,
    last_macro: Option<char>,
    replay_depth: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_command(&self) -> Option<&StoredCommand> {
        self.last_command.as_ref()
    }

    pub fn set_last_command(&mut self, command: Option<StoredCommand>) {
        self.last_command = command;
    }

    /// Apply the slot policy for a command that just completed.
    pub(crate) fn note_command(&mut self, stored: StoredCommand) {
        if self.in_repeat() {
            return;
        }
        let flags = stored.flags();
        if flags.intersects(CommandFlags::MOVEMENT | CommandFlags::SPECIAL) {
            return;
        }
        if flags.contains(CommandFlags::REPEATABLE) {
            trace!(target: "actions.repeat", ?stored, "last_command_set");
            self.last_command = Some(stored);
        } else {
            trace!(target: "actions.repeat", "last_command_cleared");
            self.last_command = None;
        }
    }

    /// Insert mode hands over the text it typed when it exits.
    pub fn record_text_change(&mut self, change: TextChange) {
        if self.in_repeat() {
            return;
        }
        let change = StoredCommand::TextChangeCommand(change);
        self.last_command = Some(match self.last_command.take() {
            Some(prev) if prev.flags().contains(CommandFlags::LINKED_WITH_NEXT) => {
                StoredCommand::LinkedCommand(Box::new(prev), Box::new(change))
            }
            _ => change,
        });
        trace!(target: "actions.repeat", "text_change_recorded");
    }

    pub fn in_repeat(&self) -> bool {
        self.in_repeat.get()
    }

    /// Claim the repeat flag; `None` if a repeat is already running.
    pub fn enter_repeat(&self) -> Option<RepeatGuard> {
        if self.in_repeat.replace(true) {
            return None;
        }
        Some(RepeatGuard {
            flag: Rc::clone(&self.in_repeat),
        })
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn recording_register(&self) -> Option<RegisterName> {
        self.recording.as_ref().map(|r| r.register)
    }

    /// Called by the live pipeline for every key before it is processed.
    /// Keys replayed from a macro are not recorded.
    pub fn record_key(&mut self, key: KeyInput) {
        if self.replay_depth > 0 {
            return;
        }
        if let Some(rec) = self.recording.as_mut() {
            rec.keys.push(key);
        }
    }

    pub(crate) fn start_recording(&mut self, register: RegisterName) -> Result<(), CommandError> {
        if let Some(rec) = &self.recording {
            return Err(CommandError::AlreadyRecording(rec.register.as_char()));
        }
        debug!(target: "actions.macro", register = %register.as_char(), "recording_start");
        self.recording = Some(MacroRecording {
            register,
            keys: Vec::new(),
        });
        Ok(())
    }

    /// Finish recording. The key that triggered the stop is dropped.
    pub(crate) fn stop_recording(&mut self) -> Result<(RegisterName, Vec<KeyInput>), CommandError> {
        let mut rec = self.recording.take().ok_or(CommandError::NotRecording)?;
        if self.replay_depth == 0 {
            rec.keys.pop();
        }
        debug!(target: "actions.macro", register = %rec.register.as_char(), keys = rec.keys.len(), "recording_stop");
        Ok((rec.register, rec.keys))
    }

    pub fn last_macro(&self) -> Option<char> {
        self.last_macro
    }

    pub(crate) fn set_last_macro(&mut self, register: char) {
        self.last_macro = Some(register);
    }

    pub(crate) fn replay_depth(&self) -> usize {
        self.replay_depth
    }

    pub fn is_replaying(&self) -> bool {
        self.replay_depth > 0
    }

    pub(crate) fn begin_replay(&mut self) {
        self.replay_depth += 1;
    }

    pub(crate) fn end_replay(&mut self) {
        self.replay_depth = self.replay_depth.saturating_sub(1);
    }
}
