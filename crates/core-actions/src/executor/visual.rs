//! Visual-mode handlers. Each acts on a concrete `VisualSpan`; the executor
//! clears the selection afterwards.

use core_events::KeyInput;
use core_state::{ModeKind, OperationKind, RegisterName, RegisterOperation, RegisterValue};
use core_text::{LineRange, Position, Snapshot, Span, grapheme};
use tracing::trace;

use super::{CommandExecutor, focused_view, insert_switch, line_delete_span, lines_text, place_caret};
use crate::command::{ChangeCharacterKind, CommandData, JoinKind, ModeSwitch};
use crate::error::CommandError;
use crate::host::EditorHost;
use crate::visual::VisualSpan;

const TO_NORMAL: ModeSwitch = ModeSwitch::SwitchMode(ModeKind::Normal);

/// Text a selection holds, shaped for a register.
pub(crate) fn selection_value(snap: &Snapshot, span: &VisualSpan) -> RegisterValue {
    match span {
        VisualSpan::Character(s) => RegisterValue::characters(snap.slice(*s)),
        VisualSpan::Line(range) => RegisterValue::lines(lines_text(snap, *range)),
        VisualSpan::Block(block) => {
            RegisterValue::block(block.rows().iter().map(|row| snap.slice(*row)).collect())
        }
    }
}

/// Per-line pieces of a selection, never including line breaks.
fn line_segments(snap: &Snapshot, span: &VisualSpan) -> Vec<Span> {
    match span {
        VisualSpan::Block(block) => block.rows().to_vec(),
        VisualSpan::Line(range) => range
            .lines()
            .filter(|l| *l <= snap.last_line())
            .map(|l| snap.line_span(l))
            .collect(),
        VisualSpan::Character(s) => {
            let first = snap.position(s.start).line;
            let last = snap.position(s.end).line;
            (first..=last)
                .map(|l| {
                    let line = snap.line_span(l);
                    Span::new(line.start.max(s.start), line.end.min(s.end))
                })
                .filter(|seg| !seg.is_empty())
                .collect()
        }
    }
}

impl<H: EditorHost + ?Sized> CommandExecutor<'_, H> {
    /// Write `value` to the target register and, unless that was the unnamed
    /// or blackhole register, mirror it into the unnamed one.
    fn write_register_mirrored(&mut self, name: RegisterName, value: RegisterValue) {
        let mirror = !matches!(name, RegisterName::Unnamed | RegisterName::Blackhole);
        if mirror {
            self.write_register(name, RegisterOperation::Delete, value.clone());
            self.write_register(RegisterName::Unnamed, RegisterOperation::Delete, value);
        } else {
            self.write_register(name, RegisterOperation::Delete, value);
        }
    }

    /// Remove the selection without touching registers. The caret ends at
    /// the selection start.
    fn remove_selection(&mut self, span: &VisualSpan, name: &str) -> Result<Snapshot, CommandError> {
        let settings = self.settings();
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let start = span.start(&snap);
        if let VisualSpan::Line(range) = span {
            view.move_caret_to(Position::new(range.start, 0));
            let mut scope = view.undo_scope(name);
            let after = scope.buffer_mut().delete(line_delete_span(&snap, *range));
            scope.move_caret_to(after.first_non_blank(range.start.min(after.last_line())));
            scope.complete()?;
            return Ok(after);
        }
        view.move_caret_to(start);
        let mut scope = view.undo_scope(name);
        let after = {
            let mut edit = scope.buffer_mut().edit();
            for row in span.edit_spans(&snap) {
                edit.delete(row);
            }
            edit.apply()?
        };
        place_caret(&mut scope, after.clamp_position(start), settings.virtual_edit);
        scope.complete()?;
        Ok(after)
    }

    pub(crate) fn delete_selection(
        &mut self,
        span: &VisualSpan,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let value = selection_value(&focused_view(self.host)?.snapshot(), span);
        self.remove_selection(span, "delete selection")?;
        trace!(target: "actions.dispatch", op = "delete", kind = ?span.operation_kind(), "delete_selection");
        self.write_register_mirrored(data.register_name(), value);
        Ok(TO_NORMAL)
    }

    pub(crate) fn delete_line_selection(
        &mut self,
        span: &VisualSpan,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let range = span.line_range(&focused_view(self.host)?.snapshot());
        self.delete_selection(&VisualSpan::Line(range), data)
    }

    pub(crate) fn change_selection(
        &mut self,
        span: &VisualSpan,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        if let VisualSpan::Line(range) = span {
            return self.change_line_selection(&VisualSpan::Line(*range), data);
        }
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let value = selection_value(&snap, span);
        let start = span.start(&snap);
        view.move_caret_to_virtual(start);
        let mut scope = view.undo_scope("change selection");
        {
            // Block change clears every row and types on the first one.
            let mut edit = scope.buffer_mut().edit();
            for row in span.edit_spans(&snap) {
                edit.delete(row);
            }
            edit.apply()?;
        }
        scope.move_caret_to_virtual(start);
        let linked = scope.into_linked();
        trace!(target: "actions.dispatch", op = "change", kind = ?span.operation_kind(), "change_selection");
        self.write_register_mirrored(data.register_name(), value);
        Ok(insert_switch(linked))
    }

    pub(crate) fn change_line_selection(
        &mut self,
        span: &VisualSpan,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let range = span.line_range(&focused_view(self.host)?.snapshot());
        let name = data.register_name();
        let switch = self.change_line_range(range, data)?;
        if !matches!(name, RegisterName::Unnamed | RegisterName::Blackhole) {
            let value = self.session.registers.get_register(name).value;
            self.write_register(RegisterName::Unnamed, RegisterOperation::Delete, value);
        }
        Ok(switch)
    }

    pub(crate) fn yank_selection(
        &mut self,
        span: &VisualSpan,
        data: CommandData,
        whole_lines: bool,
    ) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let value = if whole_lines {
            RegisterValue::lines(lines_text(&snap, span.line_range(&snap)))
        } else {
            selection_value(&snap, span)
        };
        view.move_caret_to(span.start(&snap));
        self.write_register(data.register_name(), RegisterOperation::Yank, value);
        Ok(ModeSwitch::SwitchPreviousMode)
    }

    /// Replace the selection with a register's text. The replaced text goes
    /// to the unnamed register only, after the source has been read.
    pub(crate) fn put_over_selection(
        &mut self,
        span: &VisualSpan,
        move_caret_after_text: bool,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let name = data.register_name();
        let source = self.session.registers.get_register(name).value;
        if source.is_empty() {
            return Err(CommandError::EmptyRegister(name.as_char()));
        }
        let replaced = selection_value(&focused_view(self.host)?.snapshot(), span);
        let id = self.focused();
        let mut frame = self.open_frames();
        frame.open(id, "put over selection")?;
        let result = frame.put_over_inner(span, move_caret_after_text, &source, data);
        frame.complete()?;
        result?;
        self.write_register(RegisterName::Unnamed, RegisterOperation::Delete, replaced);
        Ok(TO_NORMAL)
    }

    fn put_over_inner(
        &mut self,
        span: &VisualSpan,
        move_caret_after_text: bool,
        source: &RegisterValue,
        data: CommandData,
    ) -> Result<(), CommandError> {
        let after = self.remove_selection(span, "delete selection")?;
        let count = data.count_or_default();
        match span {
            VisualSpan::Line(range) => {
                let source = match source.kind {
                    OperationKind::LineWise => source.clone(),
                    _ => RegisterValue::lines(format!("{}\n", source.text())),
                };
                // Deleting the tail of the buffer leaves the caret above the gap.
                let below = range.start > after.last_line();
                let line = range.start.min(after.last_line());
                focused_view(self.host)?.move_caret_to_virtual(Position::new(line, 0));
                self.put_value(below, move_caret_after_text, &source, count)?;
            }
            _ => {
                let start = span.start(&after);
                focused_view(self.host)?.move_caret_to_virtual(after.clamp_position(start));
                self.put_value(false, move_caret_after_text, source, count)?;
            }
        }
        Ok(())
    }

    pub(crate) fn join_selection(
        &mut self,
        span: &VisualSpan,
        kind: JoinKind,
    ) -> Result<ModeSwitch, CommandError> {
        let snap = focused_view(self.host)?.snapshot();
        let mut range = span.line_range(&snap);
        if range.count < 2 {
            range = LineRange::new(range.start, 2);
        }
        if range.last_line() > snap.last_line() {
            return Err(CommandError::JoinCount);
        }
        self.join_range(range, kind)?;
        Ok(TO_NORMAL)
    }

    pub(crate) fn replace_selection(
        &mut self,
        span: &VisualSpan,
        key: KeyInput,
    ) -> Result<ModeSwitch, CommandError> {
        let Some(text) = key.literal_text() else {
            return Ok(TO_NORMAL);
        };
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let start = span.start(&snap);
        let mut scope = view.undo_scope("replace selection");
        {
            let mut edit = scope.buffer_mut().edit();
            for seg in line_segments(&snap, span) {
                let count = grapheme::iter(&snap.slice(seg)).count();
                edit.replace(seg, text.repeat(count));
            }
            edit.apply()?;
        }
        scope.move_caret_to(start);
        scope.complete()?;
        trace!(target: "actions.dispatch", op = "replace", kind = ?span.operation_kind(), "replace_selection");
        Ok(TO_NORMAL)
    }

    pub(crate) fn shift_selection(
        &mut self,
        span: &VisualSpan,
        right: bool,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let times = data.count_or_default();
        match span {
            VisualSpan::Block(_) => self.shift_block(span, right, times)?,
            _ => {
                let range = span.line_range(&focused_view(self.host)?.snapshot());
                self.shift_line_range(range, right, times)?
            }
        };
        Ok(TO_NORMAL)
    }

    /// Block shift moves text right of the block's left edge. Lines that end
    /// at or before that column are left alone.
    fn shift_block(
        &mut self,
        span: &VisualSpan,
        right: bool,
        times: usize,
    ) -> Result<ModeSwitch, CommandError> {
        let settings = self.settings();
        let amount = settings.shift_width.saturating_mul(times);
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let start = span.start(&snap);
        let column = snap.visual_column(start);
        let range = span.line_range(&snap);
        let mut scope = view.undo_scope("shift block");
        {
            let mut edit = scope.buffer_mut().edit();
            for line in range.lines().filter(|l| *l <= snap.last_line()) {
                if snap.line_visual_width(line) <= column {
                    continue;
                }
                let at = snap.line_start(line) + snap.byte_for_visual_column(line, column);
                if right {
                    edit.insert(at, " ".repeat(amount));
                } else {
                    let rest = snap.slice(Span::new(at, snap.line_end(line)));
                    let removable = rest
                        .chars()
                        .take_while(|c| *c == ' ' || *c == '\t')
                        .take(amount)
                        .map(char::len_utf8)
                        .sum::<usize>();
                    edit.delete(Span::new(at, at + removable));
                }
            }
            edit.apply()?;
        }
        scope.move_caret_to(start);
        scope.complete()?;
        trace!(target: "actions.dispatch", op = "shift_block", right, column, lines = range.count, "shift_block");
        Ok(TO_NORMAL)
    }

    pub(crate) fn change_case_selection(
        &mut self,
        span: &VisualSpan,
        kind: ChangeCharacterKind,
    ) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let start = span.start(&snap);
        let mut scope = view.undo_scope("change case");
        {
            let mut edit = scope.buffer_mut().edit();
            for seg in line_segments(&snap, span) {
                edit.replace(seg, kind.apply(&snap.slice(seg)));
            }
            edit.apply()?;
        }
        scope.move_caret_to(start);
        scope.complete()?;
        Ok(TO_NORMAL)
    }
}
