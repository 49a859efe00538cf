//! Delete, change, yank, replace and case handlers.

use core_events::KeyInput;
use core_state::{OperationKind, RegisterOperation, RegisterValue};
use core_text::{LineRange, Position, Snapshot, Span};
use tracing::trace;

use super::{
    CommandExecutor, focused_view, graphemes_backward, graphemes_forward, insert_switch,
    line_delete_span, lines_text, place_caret,
};
use crate::command::{ChangeCharacterKind, CommandData, ModeSwitch};
use crate::error::CommandError;
use crate::host::EditorHost;
use crate::motion::Motion;

/// `cw` stops at the end of the last word instead of eating the whitespace
/// after it. A span of only whitespace is left alone.
pub(crate) fn trim_forward_word(snap: &Snapshot, span: Span) -> Span {
    let mut end = span.end;
    while end > span.start {
        let prev = snap.prev_char_offset(end);
        match snap.char_at(prev) {
            Some(c) if c.is_whitespace() => end = prev,
            _ => break,
        }
    }
    if end == span.start {
        span
    } else {
        Span::new(span.start, end)
    }
}

impl<H: EditorHost + ?Sized> CommandExecutor<'_, H> {
    pub(crate) fn delete_motion(
        &mut self,
        motion: Motion,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let settings = self.settings();
        let result = self.resolve_motion(motion, data.count, true)?;
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let (span, value) = match result.operation_kind {
            OperationKind::LineWise => (
                line_delete_span(&snap, result.line_range),
                RegisterValue::lines(lines_text(&snap, result.line_range)),
            ),
            _ => (result.span, RegisterValue::characters(snap.slice(result.span))),
        };
        if result.operation_kind == OperationKind::LineWise {
            view.move_caret_to(Position::new(result.line_range.start, 0));
        } else {
            view.move_caret_to(snap.position(span.start));
        }
        let mut scope = view.undo_scope("delete");
        let after = scope.buffer_mut().delete(span);
        let caret = match result.operation_kind {
            OperationKind::LineWise => {
                after.first_non_blank(result.line_range.start.min(after.last_line()))
            }
            _ => after.position(span.start),
        };
        place_caret(&mut scope, caret, settings.virtual_edit);
        scope.complete()?;
        trace!(target: "actions.dispatch", op = "delete", ?motion, start = span.start, end = span.end, "delete_motion");
        self.write_register(data.register_name(), RegisterOperation::Delete, value);
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn delete_lines(&mut self, data: CommandData) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let range = snap.line_range(caret.line, data.count_or_default());
        let value = RegisterValue::lines(lines_text(&snap, range));
        view.move_caret_to(Position::new(caret.line, 0));
        let mut scope = view.undo_scope("delete lines");
        let after = scope.buffer_mut().delete(line_delete_span(&snap, range));
        let caret = after.first_non_blank(range.start.min(after.last_line()));
        scope.move_caret_to(caret);
        scope.complete()?;
        self.write_register(data.register_name(), RegisterOperation::Delete, value);
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn delete_till_end_of_line(
        &mut self,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let settings = self.settings();
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let last = caret
            .line
            .saturating_add(data.count_or_default() - 1)
            .min(snap.last_line());
        let span = Span::new(snap.offset(caret), snap.line_end(last));
        let value = RegisterValue::characters(snap.slice(span));
        let mut scope = view.undo_scope("delete to end");
        let after = scope.buffer_mut().delete(span);
        place_caret(&mut scope, after.position(span.start), settings.virtual_edit);
        scope.complete()?;
        self.write_register(data.register_name(), RegisterOperation::Delete, value);
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn delete_character_at_caret(
        &mut self,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let settings = self.settings();
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let content = snap.line(caret.line);
        // Nothing under the caret on an empty line; Vim does not beep here.
        if content.is_empty() || caret.byte >= content.len() {
            return Ok(ModeSwitch::NoSwitch);
        }
        let (end, _) = graphemes_forward(&content, caret.byte, data.count_or_default());
        let line_start = snap.line_start(caret.line);
        let span = Span::new(line_start + caret.byte, line_start + end);
        let value = RegisterValue::characters(snap.slice(span));
        let mut scope = view.undo_scope("delete char");
        let after = scope.buffer_mut().delete(span);
        place_caret(&mut scope, after.position(span.start), settings.virtual_edit);
        scope.complete()?;
        self.write_register(data.register_name(), RegisterOperation::Delete, value);
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn delete_character_before_caret(
        &mut self,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        if caret.byte == 0 {
            return Err(CommandError::AtLineStart);
        }
        let content = snap.line(caret.line);
        let start = graphemes_backward(&content, caret.byte, data.count_or_default());
        let line_start = snap.line_start(caret.line);
        let span = Span::new(line_start + start, line_start + caret.byte);
        let value = RegisterValue::characters(snap.slice(span));
        let mut scope = view.undo_scope("delete char before");
        scope.buffer_mut().delete(span);
        scope.move_caret_to(Position::new(caret.line, start));
        scope.complete()?;
        self.write_register(data.register_name(), RegisterOperation::Delete, value);
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn change_motion(
        &mut self,
        motion: Motion,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let result = self.resolve_motion(motion, data.count, true)?;
        if result.operation_kind == OperationKind::LineWise {
            return self.change_line_range(result.line_range, data);
        }
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let span = if result.is_forward_word() {
            trim_forward_word(&snap, result.span)
        } else {
            result.span
        };
        view.move_caret_to_virtual(snap.position(span.start));
        let value = RegisterValue::characters(snap.slice(span));
        let mut scope = view.undo_scope("change");
        let after = scope.buffer_mut().delete(span);
        scope.move_caret_to_virtual(after.position(span.start));
        let linked = scope.into_linked();
        trace!(target: "actions.dispatch", op = "change", ?motion, start = span.start, end = span.end, "change_motion");
        self.write_register(data.register_name(), RegisterOperation::Delete, value);
        Ok(insert_switch(linked))
    }

    pub(crate) fn change_lines(&mut self, data: CommandData) -> Result<ModeSwitch, CommandError> {
        let (snap, caret) = {
            let view = focused_view(self.host)?;
            (view.snapshot(), view.caret())
        };
        let range = snap.line_range(caret.line, data.count_or_default());
        self.change_line_range(range, data)
    }

    /// Replace whole lines with a single line holding the first line's
    /// indent (when `auto_indent` is on) and enter Insert mode after it.
    pub(crate) fn change_line_range(
        &mut self,
        range: LineRange,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let settings = self.settings();
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let indent = if settings.auto_indent {
            snap.leading_blank(range.start)
        } else {
            String::new()
        };
        let value = RegisterValue::lines(lines_text(&snap, range));
        let span = Span::new(snap.line_start(range.start), snap.line_end(range.last_line()));
        view.move_caret_to(Position::new(range.start, 0));
        let mut scope = view.undo_scope("change lines");
        scope.buffer_mut().replace(span, &indent);
        scope.move_caret_to_virtual(Position::new(range.start, indent.len()));
        let linked = scope.into_linked();
        self.write_register(data.register_name(), RegisterOperation::Delete, value);
        Ok(insert_switch(linked))
    }

    pub(crate) fn change_till_end_of_line(
        &mut self,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let last = caret
            .line
            .saturating_add(data.count_or_default() - 1)
            .min(snap.last_line());
        let span = Span::new(snap.offset(caret), snap.line_end(last));
        let value = RegisterValue::characters(snap.slice(span));
        let mut scope = view.undo_scope("change to end");
        let after = scope.buffer_mut().delete(span);
        scope.move_caret_to_virtual(after.position(span.start));
        let linked = scope.into_linked();
        self.write_register(data.register_name(), RegisterOperation::Delete, value);
        Ok(insert_switch(linked))
    }

    pub(crate) fn substitute_character_at_caret(
        &mut self,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let content = snap.line(caret.line);
        let (end, _) = graphemes_forward(&content, caret.byte, data.count_or_default());
        let line_start = snap.line_start(caret.line);
        let span = Span::new(line_start + caret.byte.min(content.len()), line_start + end);
        let value = RegisterValue::characters(snap.slice(span));
        let mut scope = view.undo_scope("substitute");
        let after = scope.buffer_mut().delete(span);
        scope.move_caret_to_virtual(after.position(span.start));
        let linked = scope.into_linked();
        if !value.is_empty() {
            self.write_register(data.register_name(), RegisterOperation::Delete, value);
        }
        Ok(insert_switch(linked))
    }

    pub(crate) fn yank_motion(
        &mut self,
        motion: Motion,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let result = self.resolve_motion(motion, data.count, true)?;
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let value = match result.operation_kind {
            OperationKind::LineWise => RegisterValue::lines(lines_text(&snap, result.line_range)),
            _ => RegisterValue::characters(snap.slice(result.span)),
        };
        // A backward yank leaves the caret at the start of what was yanked.
        match result.operation_kind {
            OperationKind::LineWise if result.line_range.start < caret.line => {
                view.move_caret_to(Position::new(result.line_range.start, caret.byte));
            }
            OperationKind::LineWise => {}
            _ if result.span.start < snap.offset(caret) => {
                view.move_caret_to(snap.position(result.span.start));
            }
            _ => {}
        }
        self.write_register(data.register_name(), RegisterOperation::Yank, value);
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn yank_lines(&mut self, data: CommandData) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let range = snap.line_range(view.caret().line, data.count_or_default());
        let value = RegisterValue::lines(lines_text(&snap, range));
        self.write_register(data.register_name(), RegisterOperation::Yank, value);
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn replace_char(
        &mut self,
        key: KeyInput,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        // `r<Esc>` cancels.
        let Some(text) = key.literal_text() else {
            return Ok(ModeSwitch::NoSwitch);
        };
        let count = data.count_or_default();
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let content = snap.line(caret.line);
        let (end, stepped) = graphemes_forward(&content, caret.byte, count);
        if stepped < count {
            return Err(CommandError::PastLineEnd);
        }
        let line_start = snap.line_start(caret.line);
        let span = Span::new(line_start + caret.byte, line_start + end);
        let mut scope = view.undo_scope("replace");
        if text == "\n" {
            // Any count replaces the characters with one line break.
            scope.buffer_mut().replace(span, "\n");
            scope.move_caret_to(Position::new(caret.line + 1, 0));
        } else {
            scope.buffer_mut().replace(span, &text.repeat(count));
            scope.move_caret_to(Position::new(caret.line, caret.byte + text.len() * (count - 1)));
        }
        scope.complete()?;
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn change_case_caret_point(
        &mut self,
        kind: ChangeCharacterKind,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let content = snap.line(caret.line);
        if content.is_empty() {
            return Ok(ModeSwitch::NoSwitch);
        }
        let (end, _) = graphemes_forward(&content, caret.byte, data.count_or_default());
        let line_start = snap.line_start(caret.line);
        let span = Span::new(line_start + caret.byte, line_start + end);
        let replacement = kind.apply(&snap.slice(span));
        let mut scope = view.undo_scope("change case");
        scope.buffer_mut().replace(span, &replacement);
        scope.move_caret_to(Position::new(caret.line, caret.byte + replacement.len()));
        scope.complete()?;
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn change_case_motion(
        &mut self,
        kind: ChangeCharacterKind,
        motion: Motion,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let result = self.resolve_motion(motion, data.count, true)?;
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let span = match result.operation_kind {
            OperationKind::LineWise => snap.line_range_span(result.line_range),
            _ => result.span,
        };
        let replacement = kind.apply(&snap.slice(span));
        let mut scope = view.undo_scope("change case");
        let after = scope.buffer_mut().replace(span, &replacement);
        let caret = match result.operation_kind {
            OperationKind::LineWise => Position::new(result.line_range.start, 0),
            _ => after.position(span.start),
        };
        scope.move_caret_to(caret);
        scope.complete()?;
        Ok(ModeSwitch::NoSwitch)
    }
}
