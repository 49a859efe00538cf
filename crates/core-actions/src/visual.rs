//! Visual spans and their position-independent stored form.
//!
//! A `VisualSpan` is the concrete selection a Visual command acts on. When
//! that command is repeated the original offsets mean nothing, so the last
//! command slot keeps a `StoredVisualSpan` (a shape) and rehydrates it at the
//! caret with [`StoredVisualSpan::reconstruct`]. Character shapes count
//! grapheme columns; block edges are visual (cell) columns so a block stays
//! rectangular across wide characters.

use core_state::{OperationKind, Selection};
use core_text::{LineRange, Position, Snapshot, Span, grapheme};

/// Non-empty, top-to-bottom rows of a rectangular selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSpan {
    rows: Vec<Span>,
}

impl BlockSpan {
    pub fn new(rows: Vec<Span>) -> Option<Self> {
        (!rows.is_empty()).then_some(Self { rows })
    }

    pub fn rows(&self) -> &[Span] {
        &self.rows
    }

    pub fn first(&self) -> Span {
        self.rows[0]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualSpan {
    Character(Span),
    Line(LineRange),
    Block(BlockSpan),
}

impl VisualSpan {
    /// Span covered by a selection in the given visual flavour. Character
    /// selections include the grapheme under the far endpoint.
    pub fn from_selection(snap: &Snapshot, selection: Selection, kind: OperationKind) -> Self {
        let (a, b) = if selection.anchor <= selection.active {
            (selection.anchor, selection.active)
        } else {
            (selection.active, selection.anchor)
        };
        let (a, b) = (snap.clamp_position(a), snap.clamp_position(b));
        match kind {
            OperationKind::CharacterWise => {
                let content = snap.line(b.line);
                let end = if b.byte >= content.len() {
                    snap.line_end_including_break(b.line)
                } else {
                    snap.line_start(b.line) + grapheme::next_boundary(&content, b.byte)
                };
                VisualSpan::Character(Span::new(snap.offset(a), end))
            }
            OperationKind::LineWise => VisualSpan::Line(LineRange::from_lines(a.line, b.line)),
            OperationKind::BlockWise => {
                let cell = |p: Position| {
                    let left = snap.visual_column(p);
                    (left, snap.visual_column_after(p).max(left + 1))
                };
                let ((la, ra), (lb, rb)) = (cell(selection.anchor), cell(selection.active));
                let (left, right) = (la.min(lb), ra.max(rb));
                block_rows(snap, LineRange::from_lines(a.line, b.line), left, right - left)
            }
        }
    }

    pub fn operation_kind(&self) -> OperationKind {
        match self {
            VisualSpan::Character(_) => OperationKind::CharacterWise,
            VisualSpan::Line(_) => OperationKind::LineWise,
            VisualSpan::Block(_) => OperationKind::BlockWise,
        }
    }

    pub fn start(&self, snap: &Snapshot) -> Position {
        match self {
            VisualSpan::Character(span) => snap.position(span.start),
            VisualSpan::Line(range) => Position::new(range.start, 0),
            VisualSpan::Block(block) => snap.position(block.first().start),
        }
    }

    /// Ranges an edit touches. Line spans include their trailing line break.
    pub fn edit_spans(&self, snap: &Snapshot) -> Vec<Span> {
        match self {
            VisualSpan::Character(span) => vec![*span],
            VisualSpan::Line(range) => vec![snap.line_range_span(*range)],
            VisualSpan::Block(block) => block.rows().to_vec(),
        }
    }

    pub fn line_range(&self, snap: &Snapshot) -> LineRange {
        match self {
            VisualSpan::Character(span) => {
                let first = snap.position(span.start).line;
                let last = snap.position(span.end.saturating_sub(1).max(span.start)).line;
                LineRange::from_lines(first, last)
            }
            VisualSpan::Line(range) => *range,
            VisualSpan::Block(block) => {
                let first = snap.position(block.first().start).line;
                LineRange::new(first, block.rows().len())
            }
        }
    }
}

fn block_rows(snap: &Snapshot, lines: LineRange, column: usize, width: usize) -> VisualSpan {
    let rows: Vec<Span> = lines
        .lines()
        .map(|line| {
            let base = snap.line_start(line);
            let start = snap.byte_for_visual_column(line, column);
            // A wide grapheme straddling the right edge is taken whole.
            let end = match width {
                0 => start,
                _ => {
                    let last = snap.byte_for_visual_column(line, column + width - 1);
                    grapheme::next_boundary(&snap.line(line), last).max(start)
                }
            };
            Span::new(base + start, base + end)
        })
        .collect();
    match BlockSpan::new(rows) {
        Some(block) => VisualSpan::Block(block),
        None => VisualSpan::Line(lines),
    }
}

/// Position-independent selection shape kept for repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredVisualSpan {
    Line { count: usize },
    /// `end_offset` is a column delta on the caret line when
    /// `end_line_offset == 0`, else the end column on the last line.
    Character { end_line_offset: usize, end_offset: usize },
    Block { width: usize, line_count: usize },
}

impl StoredVisualSpan {
    pub fn of(span: &VisualSpan, snap: &Snapshot) -> Self {
        match span {
            VisualSpan::Line(range) => StoredVisualSpan::Line { count: range.count },
            VisualSpan::Character(s) => {
                let start = snap.position(s.start);
                let end = snap.position(s.end);
                let end_line_offset = end.line - start.line;
                let end_offset = if end_line_offset == 0 {
                    snap.column(end) - snap.column(start)
                } else {
                    snap.column(end)
                };
                StoredVisualSpan::Character {
                    end_line_offset,
                    end_offset,
                }
            }
            VisualSpan::Block(block) => {
                let width = block
                    .rows()
                    .iter()
                    .map(|row| {
                        snap.visual_column(snap.position(row.end))
                            - snap.visual_column(snap.position(row.start))
                    })
                    .max()
                    .unwrap_or(0);
                StoredVisualSpan::Block {
                    width,
                    line_count: block.rows().len(),
                }
            }
        }
    }

    /// Rehydrate this shape anchored at `caret` on `snap`.
    pub fn reconstruct(&self, snap: &Snapshot, caret: Position) -> VisualSpan {
        let caret = snap.clamp_position(caret);
        match *self {
            StoredVisualSpan::Line { count } => VisualSpan::Line(snap.line_range(caret.line, count)),
            StoredVisualSpan::Character {
                end_line_offset,
                end_offset,
            } => {
                let start = snap.offset(caret);
                let end = if end_line_offset == 0 {
                    let column = snap.column(caret) + end_offset;
                    snap.line_start(caret.line) + snap.byte_for_column(caret.line, column)
                } else {
                    let line = caret.line + end_line_offset;
                    if line > snap.last_line() {
                        snap.len()
                    } else {
                        snap.line_start(line) + snap.byte_for_column(line, end_offset)
                    }
                };
                VisualSpan::Character(Span::new(start, end))
            }
            StoredVisualSpan::Block { width, line_count } => {
                let lines = snap.line_range(caret.line, line_count);
                block_rows(snap, lines, snap.visual_column(caret), width)
            }
        }
    }
}
