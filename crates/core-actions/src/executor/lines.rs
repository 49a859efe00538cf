//! Line-shaped edits: join, shift, and the commands that enter Insert mode.

use core_text::{LineRange, Position, Snapshot, Span};
use tracing::trace;

use super::{CommandExecutor, focused_view, insert_switch};
use crate::command::{CommandData, JoinKind, ModeSwitch, NormalCommand};
use crate::error::CommandError;
use crate::host::EditorHost;
use crate::motion::Motion;

/// Joined text of `range` and the byte where the caret lands: one past the
/// text contributed by the second-to-last line.
pub(crate) fn joined_text(snap: &Snapshot, range: LineRange, kind: JoinKind) -> (String, usize) {
    let mut joined = snap.line(range.start);
    let mut caret = 0;
    for line in range.start + 1..=range.last_line() {
        let next = snap.line(line);
        caret = joined.len();
        match kind {
            JoinKind::RemoveEmptySpaces => {
                let trimmed = next.trim_start_matches([' ', '\t']);
                if !joined.is_empty() && !joined.ends_with([' ', '\t']) && !trimmed.is_empty() {
                    joined.push(' ');
                }
                joined.push_str(trimmed);
            }
            JoinKind::KeepEmptySpaces => joined.push_str(&next),
        }
    }
    (joined, caret)
}

impl<H: EditorHost + ?Sized> CommandExecutor<'_, H> {
    pub(crate) fn join_lines(
        &mut self,
        kind: JoinKind,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let (snap, caret) = {
            let view = focused_view(self.host)?;
            (view.snapshot(), view.caret())
        };
        // `J` and `2J` both join two lines.
        let count = data.count_or_default().max(2);
        let last = caret
            .line
            .checked_add(count - 1)
            .filter(|last| *last <= snap.last_line())
            .ok_or(CommandError::JoinCount)?;
        self.join_range(LineRange::from_lines(caret.line, last), kind)
    }

    pub(crate) fn join_range(
        &mut self,
        range: LineRange,
        kind: JoinKind,
    ) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        if range.count < 2 {
            return Err(CommandError::JoinCount);
        }
        let (joined, caret_byte) = joined_text(&snap, range, kind);
        let span = Span::new(snap.line_start(range.start), snap.line_end(range.last_line()));
        let mut scope = view.undo_scope("join");
        scope.buffer_mut().replace(span, &joined);
        scope.move_caret_to(Position::new(range.start, caret_byte));
        scope.complete()?;
        trace!(target: "actions.dispatch", op = "join", start = range.start, count = range.count, ?kind, "join");
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn shift_lines(
        &mut self,
        right: bool,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let (snap, caret) = {
            let view = focused_view(self.host)?;
            (view.snapshot(), view.caret())
        };
        let range = snap.line_range(caret.line, data.count_or_default());
        self.shift_line_range(range, right, 1)
    }

    pub(crate) fn shift_motion_lines(
        &mut self,
        right: bool,
        motion: Motion,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let result = self.resolve_motion(motion, data.count, true)?;
        self.shift_line_range(result.line_range, right, 1)
    }

    /// Shift every non-empty line of `range` by `times` shift widths.
    pub(crate) fn shift_line_range(
        &mut self,
        range: LineRange,
        right: bool,
        times: usize,
    ) -> Result<ModeSwitch, CommandError> {
        let settings = self.settings();
        let amount = settings.shift_width.saturating_mul(times.max(1));
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let mut scope = view.undo_scope("shift");
        let after = {
            let mut edit = scope.buffer_mut().edit();
            for line in range.lines().filter(|l| *l <= snap.last_line()) {
                if snap.line_len(line) == 0 {
                    continue;
                }
                let blank = snap.leading_blank(line);
                let width = settings.indent_width(&blank);
                let width = if right {
                    width.saturating_add(amount)
                } else {
                    width.saturating_sub(amount)
                };
                let start = snap.line_start(line);
                edit.replace(Span::new(start, start + blank.len()), settings.indent_text(width));
            }
            edit.apply()?
        };
        scope.move_caret_to(after.first_non_blank(range.start.min(after.last_line())));
        scope.complete()?;
        trace!(target: "actions.dispatch", op = "shift", right, start = range.start, count = range.count, "shift");
        Ok(ModeSwitch::NoSwitch)
    }

    /// `i`, `a`, `A`, `I`: place the caret and hand over to Insert mode,
    /// which opens its own transaction.
    pub(crate) fn insert_at(&mut self, command: &NormalCommand) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let target = match command {
            NormalCommand::InsertAfterCaret => {
                let content = snap.line(caret.line);
                let next = core_text::grapheme::next_boundary(&content, caret.byte);
                Position::new(caret.line, next)
            }
            NormalCommand::InsertAtEndOfLine => Position::new(caret.line, snap.line_len(caret.line)),
            NormalCommand::InsertAtFirstNonBlank => snap.first_non_blank(caret.line),
            _ => caret,
        };
        view.move_caret_to_virtual(target);
        trace!(target: "actions.dispatch", op = "insert", line = target.line, byte = target.byte, "insert_entry");
        Ok(ModeSwitch::SwitchMode(core_state::ModeKind::Insert))
    }

    /// `o` / `O`: open a line and enter Insert mode inside the same transaction.
    pub(crate) fn insert_line(&mut self, below: bool) -> Result<ModeSwitch, CommandError> {
        let settings = self.settings();
        let id = self.focused();
        let (snap, caret) = {
            let view = focused_view(self.host)?;
            (view.snapshot(), view.caret())
        };
        let new_line = if below { caret.line + 1 } else { caret.line };
        let indent = if !settings.auto_indent {
            String::new()
        } else if let Some(width) = settings
            .use_engine_indent
            .then(|| self.host.engine_indent(id, new_line))
            .flatten()
        {
            settings.indent_text(width)
        } else {
            snap.leading_blank(caret.line)
        };
        let view = focused_view(self.host)?;
        let mut scope = view.undo_scope("open line");
        if below {
            scope
                .buffer_mut()
                .insert(snap.line_end(caret.line), &format!("\n{indent}"));
        } else {
            scope
                .buffer_mut()
                .insert(snap.line_start(caret.line), &format!("{indent}\n"));
        }
        scope.move_caret_to_virtual(Position::new(new_line, indent.len()));
        let linked = scope.into_linked();
        trace!(target: "actions.dispatch", op = "open_line", below, line = new_line, indent = indent.len(), "insert_line");
        Ok(insert_switch(linked))
    }
}
