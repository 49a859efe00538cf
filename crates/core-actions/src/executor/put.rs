//! Put (paste) handlers.
//!
//! Caret placement depends on the register's operation kind, whether it
//! holds a block, and `move_caret_after_text` (`gp` / `gP`):
//!
//! | value                    | flag unset                 | flag set                          |
//! |--------------------------|----------------------------|-----------------------------------|
//! | characters, one line     | last inserted character    | one past the inserted text        |
//! | characters, many lines   | start of the insertion     | one past the inserted text        |
//! | lines                    | first non-blank of first   | first non-blank of line after all |
//! | block                    | original insertion point   | last row, past the first row text |

use core_config::Settings;
use core_state::{OperationKind, RegisterValue, StringData};
use core_text::{Position, grapheme};
use tracing::trace;

use super::{CommandExecutor, focused_view, place_caret};
use crate::command::{CommandData, ModeSwitch};
use crate::error::CommandError;
use crate::host::EditorHost;

/// Re-indent line-wise text so its first line takes `target` as indent and
/// every other line keeps its indent relative to the first.
pub(crate) fn adjust_indent(text: &str, target: &str, settings: &Settings) -> String {
    let leading = |line: &str| -> usize {
        let blank: String = line.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
        settings.indent_width(&blank)
    };
    let base = text
        .split_terminator('\n')
        .find(|l| !l.trim().is_empty())
        .map(leading)
        .unwrap_or(0);
    let target = settings.indent_width(target);
    let mut out = String::with_capacity(text.len());
    for line in text.split_terminator('\n') {
        let body = line.trim_start_matches([' ', '\t']);
        if !body.is_empty() {
            let width = (leading(line) + target).saturating_sub(base);
            out.push_str(&settings.indent_text(width));
            out.push_str(body);
        }
        out.push('\n');
    }
    out
}

impl<H: EditorHost + ?Sized> CommandExecutor<'_, H> {
    pub(crate) fn put(
        &mut self,
        after: bool,
        move_caret_after_text: bool,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let name = data.register_name();
        let value = self.session.registers.get_register(name).value;
        if value.is_empty() {
            return Err(CommandError::EmptyRegister(name.as_char()));
        }
        self.put_value(after, move_caret_after_text, &value, data.count_or_default())
    }

    pub(crate) fn put_with_indent(
        &mut self,
        after: bool,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let name = data.register_name();
        let mut value = self.session.registers.get_register(name).value;
        if value.is_empty() {
            return Err(CommandError::EmptyRegister(name.as_char()));
        }
        if value.kind == OperationKind::LineWise {
            let settings = self.settings();
            let view = focused_view(self.host)?;
            let indent = view.snapshot().leading_blank(view.caret().line);
            value = RegisterValue::lines(adjust_indent(&value.text(), &indent, &settings));
        }
        self.put_value(after, false, &value, data.count_or_default())
    }

    pub(crate) fn put_value(
        &mut self,
        after: bool,
        move_caret_after_text: bool,
        value: &RegisterValue,
        count: usize,
    ) -> Result<ModeSwitch, CommandError> {
        match (&value.data, value.kind) {
            (StringData::Block(rows), _) => self.put_block(after, move_caret_after_text, rows, count),
            (StringData::Simple(text), OperationKind::LineWise) => {
                self.put_lines(after, move_caret_after_text, text, count)
            }
            (StringData::Simple(text), _) => {
                self.put_characters(after, move_caret_after_text, text, count)
            }
        }
    }

    fn put_characters(
        &mut self,
        after: bool,
        move_caret_after_text: bool,
        text: &str,
        count: usize,
    ) -> Result<ModeSwitch, CommandError> {
        let settings = self.settings();
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let content = snap.line(caret.line);
        let byte = if after && !content.is_empty() {
            grapheme::next_boundary(&content, caret.byte)
        } else {
            caret.byte
        };
        let offset = snap.line_start(caret.line) + byte;
        let text = text.repeat(count);
        let end = offset + text.len();
        let mut scope = view.undo_scope("put");
        let after_snap = scope.buffer_mut().insert(offset, &text);
        let target = if move_caret_after_text {
            after_snap.position(end)
        } else if text.contains('\n') {
            after_snap.position(offset)
        } else {
            after_snap.position(after_snap.prev_char_offset(end))
        };
        place_caret(&mut scope, target, settings.virtual_edit || move_caret_after_text);
        scope.complete()?;
        trace!(target: "actions.dispatch", op = "put", kind = "characters", offset, len = text.len(), "put");
        Ok(ModeSwitch::NoSwitch)
    }

    fn put_lines(
        &mut self,
        after: bool,
        move_caret_after_text: bool,
        text: &str,
        count: usize,
    ) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let mut block = text.to_string();
        if !block.ends_with('\n') {
            block.push('\n');
        }
        let block = block.repeat(count);
        let inserted = block.matches('\n').count();
        let target_line = if after { caret.line + 1 } else { caret.line };
        let mut scope = view.undo_scope("put lines");
        let after_snap = if target_line > snap.last_line() {
            // Appending below the last line: lead with the break instead.
            let body = &block[..block.len() - 1];
            scope.buffer_mut().insert(snap.len(), &format!("\n{body}"))
        } else {
            scope.buffer_mut().insert(snap.line_start(target_line), &block)
        };
        let line = if move_caret_after_text {
            (target_line + inserted).min(after_snap.last_line())
        } else {
            target_line
        };
        scope.move_caret_to(after_snap.first_non_blank(line));
        scope.complete()?;
        trace!(target: "actions.dispatch", op = "put", kind = "lines", line = target_line, inserted, "put");
        Ok(ModeSwitch::NoSwitch)
    }

    fn put_block(
        &mut self,
        after: bool,
        move_caret_after_text: bool,
        rows: &[String],
        count: usize,
    ) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let snap = view.snapshot();
        let caret = view.caret();
        let column = if after {
            snap.visual_column_after(caret)
        } else {
            snap.visual_column(caret)
        };
        let pieces: Vec<String> = rows.iter().map(|r| r.repeat(count)).collect();
        let mut scope = view.undo_scope("put block");
        let after_snap = {
            let mut edit = scope.buffer_mut().edit();
            let mut appended = String::new();
            for (i, piece) in pieces.iter().enumerate() {
                let line = caret.line + i;
                if line > snap.last_line() {
                    appended.push('\n');
                    appended.push_str(&" ".repeat(column));
                    appended.push_str(piece);
                    continue;
                }
                let width = snap.line_visual_width(line);
                let (byte, pad) = if width >= column {
                    (snap.byte_for_visual_column(line, column), 0)
                } else {
                    (snap.line_len(line), column - width)
                };
                edit.insert(
                    snap.line_start(line) + byte,
                    format!("{}{piece}", " ".repeat(pad)),
                );
            }
            if !appended.is_empty() {
                edit.insert(snap.len(), appended);
            }
            edit.apply()?
        };
        let target = if move_caret_after_text {
            let line = (caret.line + pieces.len() - 1).min(after_snap.last_line());
            let first_len = pieces.first().map(String::len).unwrap_or(0);
            Position::new(line, after_snap.byte_for_visual_column(line, column) + first_len)
        } else {
            Position::new(caret.line, after_snap.byte_for_visual_column(caret.line, column))
        };
        scope.move_caret_to_virtual(target);
        scope.complete()?;
        trace!(target: "actions.dispatch", op = "put", kind = "block", rows = pieces.len(), column, "put");
        Ok(ModeSwitch::NoSwitch)
    }
}
