//! Motion resolution.
//!
//! A `Motion` names a movement; a `MotionResolver` turns it into a concrete
//! `MotionResult` for the current snapshot and caret. Operators consume the
//! span; pure movement consumes `caret`. The executor only depends on the
//! trait, so hosts may plug in a richer resolver (text objects, searches).
//!
//! `TextMotionResolver` covers the common motions on top of the
//! `core_text::motion` primitives:
//! * Character motions are exclusive, except `e` which includes the grapheme
//!   it lands on. `$` runs to the line end.
//! * Vertical motions and `gg` / `G` are line-wise.
//! * `w` under an operator does not cross onto the next line when the last
//!   word moved over ends its line.

use core_state::OperationKind;
use core_text::{LineRange, Position, Snapshot, Span, grapheme, motion as prim};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    CharLeft,
    CharRight,
    LineUp,
    LineDown,
    WordForward,
    WordBackward,
    EndOfWord,
    BeginningOfLine,
    FirstNonBlank,
    EndOfLine,
    FirstLine,
    LastLine,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MotionFlags: u8 {
        const IS_WORD    = 0b01;
        const IS_FORWARD = 0b10;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionResult {
    pub span: Span,
    pub operation_kind: OperationKind,
    pub line_range: LineRange,
    pub flags: MotionFlags,
    /// Where a pure movement leaves the caret.
    pub caret: Position,
}

impl MotionResult {
    pub fn is_forward_word(&self) -> bool {
        self.flags
            .contains(MotionFlags::IS_WORD | MotionFlags::IS_FORWARD)
    }
}

pub struct MotionContext<'a> {
    pub snapshot: &'a Snapshot,
    pub caret: Position,
    pub count: Option<usize>,
    /// Resolving for an operator (`d`, `c`, `y`, ...) rather than movement.
    pub operator_pending: bool,
}

impl MotionContext<'_> {
    fn count_or_default(&self) -> usize {
        self.count.unwrap_or(1).max(1)
    }
}

pub trait MotionResolver {
    fn get_motion(&self, motion: Motion, ctx: &MotionContext<'_>) -> Option<MotionResult>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextMotionResolver;

fn character(
    snap: &Snapshot,
    from: Position,
    to: Position,
    inclusive: bool,
    flags: MotionFlags,
    caret: Position,
) -> MotionResult {
    let (a, b) = if from <= to { (from, to) } else { (to, from) };
    let start = snap.offset(a);
    let mut end = snap.offset(b);
    if inclusive {
        let content = snap.line(b.line);
        end = snap.line_start(b.line) + grapheme::next_boundary(&content, b.byte.min(content.len()));
    }
    MotionResult {
        span: Span::new(start, end),
        operation_kind: OperationKind::CharacterWise,
        line_range: LineRange::from_lines(a.line, b.line),
        flags,
        caret,
    }
}

fn lines(snap: &Snapshot, a: usize, b: usize, flags: MotionFlags, caret: Position) -> MotionResult {
    let range = LineRange::from_lines(a, b);
    MotionResult {
        span: snap.line_range_span(range),
        operation_kind: OperationKind::LineWise,
        line_range: range,
        flags,
        caret,
    }
}

impl MotionResolver for TextMotionResolver {
    fn get_motion(&self, motion: Motion, ctx: &MotionContext<'_>) -> Option<MotionResult> {
        let snap = ctx.snapshot;
        let caret = snap.clamp_position(ctx.caret);
        let count = ctx.count_or_default();
        let forward = MotionFlags::IS_FORWARD;
        match motion {
            Motion::CharLeft => {
                if caret.byte == 0 {
                    return None;
                }
                let mut p = caret;
                for _ in 0..count {
                    prim::left(snap, &mut p);
                }
                Some(character(snap, p, caret, false, MotionFlags::empty(), p))
            }
            Motion::CharRight => {
                let len = snap.line_len(caret.line);
                if caret.byte >= len {
                    return None;
                }
                let mut p = caret;
                for _ in 0..count {
                    prim::right(snap, &mut p);
                }
                let mut dest = p;
                if !ctx.operator_pending {
                    prim::normalize_normal_mode_position(snap, &mut dest);
                    if dest == caret {
                        return None;
                    }
                }
                Some(character(snap, caret, p, false, forward, dest))
            }
            Motion::LineUp | Motion::LineDown => {
                let mut p = caret;
                let mut sticky = None;
                for _ in 0..count {
                    let before = p.line;
                    sticky = if motion == Motion::LineUp {
                        prim::up(snap, &mut p, sticky)
                    } else {
                        prim::down(snap, &mut p, sticky)
                    };
                    if p.line == before {
                        break;
                    }
                }
                if p.line == caret.line {
                    return None;
                }
                let flags = if motion == Motion::LineDown {
                    forward
                } else {
                    MotionFlags::empty()
                };
                Some(lines(snap, caret.line, p.line, flags, p))
            }
            Motion::WordForward => {
                let mut p = caret;
                for _ in 0..count {
                    prim::word_forward(snap, &mut p);
                }
                if p == caret {
                    return None;
                }
                let mut end = p;
                if ctx.operator_pending
                    && end.line > caret.line
                    && end.byte <= snap.first_non_blank(end.line).byte
                {
                    let prev = end.line - 1;
                    let candidate = Position::new(prev, snap.line_len(prev));
                    if candidate > caret {
                        end = candidate;
                    }
                }
                Some(character(snap, caret, end, false, MotionFlags::IS_WORD | forward, p))
            }
            Motion::WordBackward => {
                let mut p = caret;
                for _ in 0..count {
                    prim::word_backward(snap, &mut p);
                }
                if p == caret {
                    return None;
                }
                Some(character(snap, p, caret, false, MotionFlags::IS_WORD, p))
            }
            Motion::EndOfWord => {
                let mut p = caret;
                for _ in 0..count {
                    prim::word_end(snap, &mut p);
                }
                if p == caret {
                    return None;
                }
                Some(character(snap, caret, p, true, forward, p))
            }
            Motion::BeginningOfLine => {
                let p = Position::new(caret.line, 0);
                Some(character(snap, p, caret, false, MotionFlags::empty(), p))
            }
            Motion::FirstNonBlank => {
                let p = snap.first_non_blank(caret.line);
                Some(character(snap, p, caret, false, MotionFlags::empty(), p))
            }
            Motion::EndOfLine => {
                let target = caret.line.checked_add(count - 1)?;
                if target > snap.last_line() {
                    return None;
                }
                let p = Position::new(target, snap.line_len(target));
                Some(character(snap, caret, p, false, forward, p))
            }
            Motion::FirstLine | Motion::LastLine => {
                let default = if motion == Motion::FirstLine {
                    0
                } else {
                    snap.last_line()
                };
                let target = ctx
                    .count
                    .map(|n| n.max(1) - 1)
                    .unwrap_or(default)
                    .min(snap.last_line());
                let flags = if target >= caret.line {
                    forward
                } else {
                    MotionFlags::empty()
                };
                Some(lines(snap, caret.line, target, flags, snap.first_non_blank(target)))
            }
        }
    }
}
