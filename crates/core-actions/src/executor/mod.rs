//! Command Executor.
//!
//! Each Normal / Visual command variant maps to one handler. Handlers follow
//! the same protocol:
//! 1. Move the caret before opening the undo scope when undo must restore
//!    that exact spot (most deletes and changes); otherwise move it inside
//!    the scope so redo lands differently from undo.
//! 2. Open one `UndoScope` covering the mutation and the final caret move.
//! 3. Mutate the buffer, then resolve the caret against the new snapshot.
//! 4. Write the register (delete / yank bookkeeping).
//! 5. Return the command's `ModeSwitch`.
//!
//! Handlers return `Result<ModeSwitch, CommandError>` and bail with `?`. An
//! early return drops the scope, which still closes the transaction. Frames
//! that span several dispatches are held by `frames::OpenFrames`. Only the
//! public `run_*` entry points turn errors into a beep or a status message.

use core_config::Settings;
use core_state::{
    BufferId, ModeKind, RegisterName, RegisterOperation, RegisterValue, TextView,
};
use core_text::{LineRange, Position, Snapshot, Span, grapheme};
use tracing::{debug, trace, warn};

use crate::command::{
    Command, CommandData, CommandResult, ModeSwitch, NormalCommand, VisualCommand,
};
use crate::error::CommandError;
use crate::host::EditorHost;
use crate::motion::{Motion, MotionContext, MotionResult};
use crate::session::{Session, StoredCommand};
use crate::visual::{StoredVisualSpan, VisualSpan};

mod edit;
mod folds;
mod frames;
mod lines;
mod navigation;
mod put;
mod visual;

pub(crate) use frames::OpenFrames;

pub struct CommandExecutor<'a, H: EditorHost + ?Sized> {
    pub(crate) host: &'a mut H,
    pub(crate) session: &'a mut Session,
}

pub(crate) fn focused_view<H: EditorHost + ?Sized>(host: &mut H) -> Result<&mut TextView, CommandError> {
    let id = host.focused_buffer();
    host.view_mut(id).ok_or(CommandError::MissingBuffer(id))
}

/// Normal-mode caret placement honouring virtual edit.
pub(crate) fn place_caret(view: &mut TextView, pos: Position, virtual_edit: bool) {
    if virtual_edit {
        view.move_caret_to_virtual(pos);
    } else {
        view.move_caret_to(pos);
    }
}

/// Whole lines as register text, each terminated by a line break.
pub(crate) fn lines_text(snap: &Snapshot, range: LineRange) -> String {
    let mut out = String::new();
    for line in range.lines().filter(|l| *l <= snap.last_line()) {
        out.push_str(&snap.line(line));
        out.push('\n');
    }
    out
}

/// Span removing whole lines. When the range reaches the last line the
/// preceding line break goes too, so no empty trailing line is left behind.
pub(crate) fn line_delete_span(snap: &Snapshot, range: LineRange) -> Span {
    let span = snap.line_range_span(range);
    if range.last_line() >= snap.last_line() && range.start > 0 {
        Span::new(snap.line_end(range.start - 1), span.end)
    } else {
        span
    }
}

/// Byte offset `count` graphemes right of `byte`, and how many were available.
pub(crate) fn graphemes_forward(content: &str, byte: usize, count: usize) -> (usize, usize) {
    let mut b = byte.min(content.len());
    let mut stepped = 0;
    while stepped < count && b < content.len() {
        b = grapheme::next_boundary(content, b);
        stepped += 1;
    }
    (b, stepped)
}

pub(crate) fn graphemes_backward(content: &str, byte: usize, count: usize) -> usize {
    let mut b = byte.min(content.len());
    let mut stepped = 0;
    while stepped < count && b > 0 {
        b = grapheme::prev_boundary(content, b);
        stepped += 1;
    }
    b
}

impl<'a, H: EditorHost + ?Sized> CommandExecutor<'a, H> {
    pub fn new(host: &'a mut H, session: &'a mut Session) -> Self {
        Self { host, session }
    }

    pub fn run_command(&mut self, command: &Command) -> CommandResult {
        match command {
            Command::NormalCommand(command, data) => self.run_normal_command(command, *data),
            Command::VisualCommand(command, data, span) => {
                self.run_visual_command(command, *data, span)
            }
        }
    }

    pub fn run_normal_command(&mut self, command: &NormalCommand, data: CommandData) -> CommandResult {
        trace!(target: "actions.dispatch", ?command, count = ?data.count, "run_normal_command");
        let result = self.dispatch_normal(command, data);
        if result.is_ok() {
            self.session.note_command(StoredCommand::NormalCommand {
                command: command.clone(),
                data,
            });
        }
        self.finish(result)
    }

    pub fn run_visual_command(
        &mut self,
        command: &VisualCommand,
        data: CommandData,
        span: &VisualSpan,
    ) -> CommandResult {
        trace!(target: "actions.dispatch", ?command, kind = ?span.operation_kind(), "run_visual_command");
        let result = self.dispatch_visual_recorded(command, data, span);
        self.finish(result)
    }

    fn dispatch_visual_recorded(
        &mut self,
        command: &VisualCommand,
        data: CommandData,
        span: &VisualSpan,
    ) -> Result<ModeSwitch, CommandError> {
        // Captured before the edit: replay rebuilds the span from its shape.
        let stored = StoredVisualSpan::of(span, &focused_view(self.host)?.snapshot());
        let switch = self.dispatch_visual(command, data, span)?;
        self.session.note_command(StoredCommand::VisualCommand {
            command: command.clone(),
            data,
            span: stored,
        });
        Ok(switch)
    }

    fn finish(&mut self, result: Result<ModeSwitch, CommandError>) -> CommandResult {
        match result {
            Ok(switch) => CommandResult::Completed(switch),
            Err(e) if e.is_silent() => {
                debug!(target: "actions.dispatch", error = %e, "beep");
                self.host.status().beep();
                CommandResult::Error
            }
            Err(e) => {
                warn!(target: "actions.dispatch", error = %e, "command_error");
                self.host.status().on_error(&e.to_string());
                CommandResult::Error
            }
        }
    }

    pub(crate) fn settings(&self) -> Settings {
        self.host.settings().clone()
    }

    pub(crate) fn focused(&self) -> BufferId {
        self.host.focused_buffer()
    }

    pub(crate) fn resolve_motion(
        &mut self,
        motion: Motion,
        count: Option<usize>,
        operator_pending: bool,
    ) -> Result<MotionResult, CommandError> {
        let (snap, caret) = {
            let view = focused_view(self.host)?;
            (view.snapshot(), view.caret())
        };
        let ctx = MotionContext {
            snapshot: &snap,
            caret,
            count,
            operator_pending,
        };
        self.host
            .motion_resolver()
            .get_motion(motion, &ctx)
            .ok_or(CommandError::MotionFailed)
    }

    pub(crate) fn write_register(
        &mut self,
        name: RegisterName,
        operation: RegisterOperation,
        value: RegisterValue,
    ) {
        self.session.registers.set_register_value(name, operation, value);
    }

    pub(crate) fn dispatch_normal(
        &mut self,
        command: &NormalCommand,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        use NormalCommand::*;
        match command {
            DeleteMotion(motion) => self.delete_motion(*motion, data),
            DeleteLines => self.delete_lines(data),
            DeleteTillEndOfLine => self.delete_till_end_of_line(data),
            DeleteCharacterAtCaret => self.delete_character_at_caret(data),
            DeleteCharacterBeforeCaret => self.delete_character_before_caret(data),
            ChangeMotion(motion) => self.change_motion(*motion, data),
            ChangeLines => self.change_lines(data),
            ChangeTillEndOfLine => self.change_till_end_of_line(data),
            SubstituteCharacterAtCaret => self.substitute_character_at_caret(data),
            Yank(motion) => self.yank_motion(*motion, data),
            YankLines => self.yank_lines(data),
            PutAfterCaret {
                move_caret_after_text,
            } => self.put(true, *move_caret_after_text, data),
            PutBeforeCaret {
                move_caret_after_text,
            } => self.put(false, *move_caret_after_text, data),
            PutAfterCaretWithIndent => self.put_with_indent(true, data),
            PutBeforeCaretWithIndent => self.put_with_indent(false, data),
            JoinLines(kind) => self.join_lines(*kind, data),
            ReplaceChar(key) => self.replace_char(*key, data),
            ShiftLinesLeft => self.shift_lines(false, data),
            ShiftLinesRight => self.shift_lines(true, data),
            ShiftMotionLinesLeft(motion) => self.shift_motion_lines(false, *motion, data),
            ShiftMotionLinesRight(motion) => self.shift_motion_lines(true, *motion, data),
            ChangeCaseCaretPoint(kind) => self.change_case_caret_point(*kind, data),
            ChangeCaseMotion(kind, motion) => self.change_case_motion(*kind, *motion, data),
            InsertAtCaret | InsertAfterCaret | InsertAtEndOfLine | InsertAtFirstNonBlank => {
                self.insert_at(command)
            }
            InsertLineAbove => self.insert_line(false),
            InsertLineBelow => self.insert_line(true),
            Undo => self.undo(data),
            Redo => self.redo(data),
            RepeatLastCommand => self.repeat_last_command(data),
            RecordMacroStart(register) => self.record_macro_start(*register),
            RecordMacroStop => self.record_macro_stop(),
            RunMacro(register) => self.run_macro(*register, data),
            SetMarkToCaret(name) => self.set_mark_to_caret(*name),
            JumpToMark(name) => self.jump_to_mark(*name, false),
            JumpToMarkLine(name) => self.jump_to_mark(*name, true),
            MoveCaretToMotion(motion) => self.move_caret_to_motion(*motion, data),
            SwitchMode(kind) => Ok(ModeSwitch::SwitchMode(*kind)),
            FoldLines => self.fold_lines(data),
            FoldMotion(motion) => self.fold_motion(*motion, data),
            OpenFoldUnderCaret => self.open_fold_under_caret(data),
            CloseFoldUnderCaret => self.close_fold_under_caret(data),
            OpenAllFoldsUnderCaret => self.open_all_folds_under_caret(),
            CloseAllFoldsUnderCaret => self.close_all_folds_under_caret(),
            DeleteFoldUnderCaret => self.delete_fold_under_caret(),
            DeleteAllFoldsUnderCaret => self.delete_all_folds_under_caret(),
            DeleteAllFoldsInBuffer => self.delete_all_folds_in_buffer(),
            WriteBufferAndQuit => {
                let id = self.focused();
                self.host.write_buffer_and_quit(id)?;
                Ok(ModeSwitch::NoSwitch)
            }
            CloseBuffer => {
                let id = self.focused();
                self.host.close_buffer(id)?;
                Ok(ModeSwitch::NoSwitch)
            }
            SplitViewHorizontally => {
                let id = self.focused();
                self.host.split_view_horizontally(id)?;
                Ok(ModeSwitch::NoSwitch)
            }
            SplitViewVertically => {
                let id = self.focused();
                self.host.split_view_vertically(id)?;
                Ok(ModeSwitch::NoSwitch)
            }
        }
    }

    pub(crate) fn dispatch_visual(
        &mut self,
        command: &VisualCommand,
        data: CommandData,
        span: &VisualSpan,
    ) -> Result<ModeSwitch, CommandError> {
        use VisualCommand::*;
        let switch = match command {
            DeleteSelection => self.delete_selection(span, data)?,
            DeleteLineSelection => self.delete_line_selection(span, data)?,
            ChangeSelection => self.change_selection(span, data)?,
            ChangeLineSelection => self.change_line_selection(span, data)?,
            YankSelection => self.yank_selection(span, data, false)?,
            YankLineSelection => self.yank_selection(span, data, true)?,
            PutOverSelection {
                move_caret_after_text,
            } => self.put_over_selection(span, *move_caret_after_text, data)?,
            JoinSelection(kind) => self.join_selection(span, *kind)?,
            ReplaceSelection(key) => self.replace_selection(span, *key)?,
            ShiftLinesLeft => self.shift_selection(span, false, data)?,
            ShiftLinesRight => self.shift_selection(span, true, data)?,
            ChangeCase(kind) => self.change_case_selection(span, *kind)?,
            FoldSelection => self.fold_selection(span)?,
            DeleteAllFoldsInSelection => self.delete_all_folds_in_selection(span)?,
        };
        focused_view(self.host)?.clear_selection();
        Ok(switch)
    }

    fn undo(&mut self, data: CommandData) -> Result<ModeSwitch, CommandError> {
        let count = data.count_or_default();
        let done = focused_view(self.host)?.undo(count)?;
        trace!(target: "actions.dispatch", op = "undo", count, done, "undo");
        if done == 0 {
            return Err(CommandError::OldestChange);
        }
        Ok(ModeSwitch::NoSwitch)
    }

    fn redo(&mut self, data: CommandData) -> Result<ModeSwitch, CommandError> {
        let count = data.count_or_default();
        let done = focused_view(self.host)?.redo(count)?;
        trace!(target: "actions.dispatch", op = "redo", count, done, "redo");
        if done == 0 {
            return Err(CommandError::NewestChange);
        }
        Ok(ModeSwitch::NoSwitch)
    }
}

pub(crate) fn insert_switch(linked: core_state::LinkedTransaction) -> ModeSwitch {
    ModeSwitch::SwitchModeWithArgument(
        ModeKind::Insert,
        crate::command::ModeArgument::InsertWithTransaction(linked),
    )
}
