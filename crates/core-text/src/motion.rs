//! Cursor motion primitives.
//!
//! These operate purely on a `Snapshot` + `Position` pair and are free of editor state.
//! The motion resolver in `core-actions` composes them into spans for operators.

use crate::{Position, Snapshot, grapheme};

/// Normalize a position for Normal-mode semantics: a caret sitting at the end of a
/// non-empty line is pulled back onto the last grapheme so it rests on a real cell.
pub fn normalize_normal_mode_position(snap: &Snapshot, pos: &mut Position) {
    *pos = snap.clamp_position(*pos);
    let line_len = snap.line_len(pos.line);
    if line_len == 0 {
        return;
    }
    if pos.byte >= line_len {
        let content = snap.line(pos.line);
        pos.byte = grapheme::prev_boundary(&content, content.len());
    }
}

/// Move left one grapheme boundary.
pub fn left(snap: &Snapshot, pos: &mut Position) {
    if pos.byte == 0 {
        return;
    }
    let content = snap.line(pos.line);
    pos.byte = grapheme::prev_boundary(&content, pos.byte);
}

/// Move right one grapheme boundary.
pub fn right(snap: &Snapshot, pos: &mut Position) {
    let content = snap.line(pos.line);
    let next = grapheme::next_boundary(&content, pos.byte);
    if next > pos.byte {
        pos.byte = next;
    }
}

/// Move to start of line.
pub fn line_start(_snap: &Snapshot, pos: &mut Position) {
    pos.byte = 0;
}

/// Move to end of line (after last grapheme).
pub fn line_end(snap: &Snapshot, pos: &mut Position) {
    pos.byte = snap.line_len(pos.line);
}

/// Move to the first non-blank of the current line.
pub fn first_non_blank(snap: &Snapshot, pos: &mut Position) {
    *pos = snap.first_non_blank(pos.line);
}

/// Move up one line preserving a target visual column (sticky). Returns the updated sticky column.
pub fn up(snap: &Snapshot, pos: &mut Position, mut sticky_col: Option<usize>) -> Option<usize> {
    if pos.line == 0 {
        return sticky_col;
    }
    let col = *sticky_col.get_or_insert_with(|| snap.visual_column(*pos));
    pos.line -= 1;
    pos.byte = snap.byte_for_visual_column(pos.line, col);
    sticky_col
}

/// Move down one line preserving sticky visual column.
pub fn down(snap: &Snapshot, pos: &mut Position, mut sticky_col: Option<usize>) -> Option<usize> {
    if pos.line + 1 >= snap.line_count() {
        return sticky_col;
    }
    let col = *sticky_col.get_or_insert_with(|| snap.visual_column(*pos));
    pos.line += 1;
    pos.byte = snap.byte_for_visual_column(pos.line, col);
    sticky_col
}

/// Move forward to the start of the next word. Semantics (naive):
/// - If currently on a word cluster, advance past the current word, then skip any non-word clusters.
/// - If on whitespace / punctuation, skip them until a word cluster; line ends are crossed.
/// - With no further word the position lands at the end of the final line.
pub fn word_forward(snap: &Snapshot, pos: &mut Position) {
    let mut line = pos.line;
    let mut content = snap.line(line);
    let mut byte = pos.byte.min(content.len());
    if byte >= content.len() {
        if line + 1 >= snap.line_count() {
            return;
        }
        line += 1;
        byte = 0;
        content = snap.line(line);
    }
    let next_b = grapheme::next_boundary(&content, byte);
    if next_b > byte && grapheme::is_word(&content[byte..next_b]) {
        let mut b = next_b;
        while b < content.len() {
            let nb = grapheme::next_boundary(&content, b);
            if !grapheme::is_word(&content[b..nb]) {
                break;
            }
            b = nb;
        }
        byte = b;
    }
    loop {
        if byte >= content.len() {
            if line + 1 >= snap.line_count() {
                pos.line = line;
                pos.byte = content.len();
                return;
            }
            line += 1;
            byte = 0;
            content = snap.line(line);
            continue;
        }
        let nb = grapheme::next_boundary(&content, byte);
        if grapheme::is_word(&content[byte..nb]) {
            pos.line = line;
            pos.byte = byte;
            return;
        }
        byte = nb;
    }
}

/// Move backward to the start of the previous word. If currently at start of a word, move to start of previous word.
pub fn word_backward(snap: &Snapshot, pos: &mut Position) {
    if pos.line >= snap.line_count() {
        return;
    }
    let mut line = pos.line;
    let mut content = snap.line(line);
    let mut byte = pos.byte.min(content.len());
    if byte == 0 {
        if line == 0 {
            pos.byte = 0;
            return;
        }
        line -= 1;
        content = snap.line(line);
        byte = content.len();
    }
    let prev = grapheme::prev_boundary(&content, byte);
    if prev < byte && !grapheme::is_word(&content[prev..byte]) {
        byte = prev;
    }
    while byte > 0 {
        let prev_b = grapheme::prev_boundary(&content, byte);
        if grapheme::is_word(&content[prev_b..byte]) {
            break;
        }
        byte = prev_b;
    }
    while byte > 0 {
        let prev_b = grapheme::prev_boundary(&content, byte);
        if !grapheme::is_word(&content[prev_b..byte]) {
            break;
        }
        byte = prev_b;
    }
    pos.line = line;
    pos.byte = byte;
}

/// Move to the last grapheme of the current (or next) word.
pub fn word_end(snap: &Snapshot, pos: &mut Position) {
    let mut line = pos.line;
    let mut content = snap.line(line);
    let mut byte = grapheme::next_boundary(&content, pos.byte.min(content.len()));
    loop {
        if byte >= content.len() {
            if line + 1 >= snap.line_count() {
                return;
            }
            line += 1;
            byte = 0;
            content = snap.line(line);
            continue;
        }
        let nb = grapheme::next_boundary(&content, byte);
        if grapheme::is_word(&content[byte..nb]) {
            break;
        }
        byte = nb;
    }
    loop {
        let nb = grapheme::next_boundary(&content, byte);
        if nb >= content.len() || !grapheme::is_word(&content[nb..grapheme::next_boundary(&content, nb)]) {
            pos.line = line;
            pos.byte = byte;
            return;
        }
        byte = nb;
    }
}
