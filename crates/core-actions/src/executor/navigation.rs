//! Marks and pure caret movement. None of these touch undo.

use core_text::Position;
use tracing::trace;

use super::{CommandExecutor, focused_view, place_caret};
use crate::command::{CommandData, ModeSwitch};
use crate::error::CommandError;
use crate::host::EditorHost;
use crate::motion::Motion;

/// Mark holding the caret position before the latest jump.
pub(crate) const PREVIOUS_CONTEXT_MARK: char = '\'';

fn mark_key(name: char) -> Option<char> {
    match name {
        'a'..='z' | 'A'..='Z' => Some(name),
        '\'' | '`' => Some(PREVIOUS_CONTEXT_MARK),
        _ => None,
    }
}

impl<H: EditorHost + ?Sized> CommandExecutor<'_, H> {
    pub(crate) fn set_mark_to_caret(&mut self, name: char) -> Result<ModeSwitch, CommandError> {
        let key = mark_key(name).ok_or(CommandError::InvalidMark(name))?;
        let view = focused_view(self.host)?;
        let caret = view.caret();
        view.set_mark(key, caret);
        trace!(target: "actions.dispatch", op = "mark", mark = %key, line = caret.line, byte = caret.byte, "set_mark");
        Ok(ModeSwitch::NoSwitch)
    }

    /// `` `x `` jumps to the exact mark; `'x` to the first non-blank of its line.
    pub(crate) fn jump_to_mark(
        &mut self,
        name: char,
        line_only: bool,
    ) -> Result<ModeSwitch, CommandError> {
        let key = mark_key(name).ok_or(CommandError::InvalidMark(name))?;
        let view = focused_view(self.host)?;
        let target = view.mark(key).ok_or(CommandError::MarkNotSet(name))?;
        let target = if line_only {
            view.snapshot().first_non_blank(target.line)
        } else {
            target
        };
        let from = view.caret();
        view.set_mark(PREVIOUS_CONTEXT_MARK, from);
        view.move_caret_to(target);
        trace!(target: "actions.dispatch", op = "jump", mark = %name, line = target.line, byte = target.byte, "jump_to_mark");
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn move_caret_to_motion(
        &mut self,
        motion: Motion,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let settings = self.settings();
        let result = self.resolve_motion(motion, data.count, false)?;
        let view = focused_view(self.host)?;
        let from: Position = view.caret();
        place_caret(view, result.caret, settings.virtual_edit);
        trace!(target: "actions.dispatch", op = "move", ?motion, from_line = from.line, from_byte = from.byte, line = result.caret.line, byte = result.caret.byte, "move_caret");
        Ok(ModeSwitch::NoSwitch)
    }
}
