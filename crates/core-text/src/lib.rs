//! Rope-backed snapshot buffer.
//!
//! Every mutation of a [`Buffer`] yields a new immutable [`Snapshot`] tagged
//! with a monotonically increasing version. Snapshots share structure through
//! `ropey`, so undo history and stale-position re-resolution can hold on to
//! old versions cheaply.
//!
//! Coordinates:
//! * Offsets are absolute UTF-8 byte indices into a snapshot.
//! * [`Position`] is the `(line, byte within line)` view of the same point.
//! * [`Span`] is a half-open `[start, end)` offset range.
//! * Line content accessors never include the trailing line break.
//!
//! A position computed against one snapshot must be re-resolved (see
//! [`Snapshot::clamp_position`]) before it is used against a newer one.

use anyhow::Result;
use ropey::Rope;
use thiserror::Error;

pub mod motion;

/// A position inside a buffer expressed as (line index, byte offset within that line).
/// Lines and byte offsets are guaranteed (when clamped) to be on UTF-8 code unit boundaries; grapheme
/// safety is enforced by the motion layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub byte: usize,
}

impl Position {
    pub fn new(line: usize, byte: usize) -> Self {
        Self { line, byte }
    }
    pub fn origin() -> Self {
        Self { line: 0, byte: 0 }
    }
    pub fn clamp_to<F>(&mut self, line_count: usize, mut line_len_fn: F)
    where
        F: FnMut(usize) -> usize,
    {
        if line_count == 0 {
            self.line = 0;
            self.byte = 0;
            return;
        }
        if self.line >= line_count {
            self.line = line_count - 1;
        }
        let max_len = line_len_fn(self.line);
        if self.byte > max_len {
            self.byte = max_len;
        }
    }
}

/// Half-open absolute byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    /// Construct a span normalizing ordering so that `start <= end`.
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }
    pub fn empty(at: usize) -> Self {
        Self { start: at, end: at }
    }
    pub fn len(&self) -> usize {
        self.end - self.start
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Inclusive run of `count` lines starting at `start`. Never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    pub start: usize,
    pub count: usize,
}

impl LineRange {
    pub fn new(start: usize, count: usize) -> Self {
        Self {
            start,
            count: count.max(1),
        }
    }
    /// Range covering `a..=b` regardless of argument order.
    pub fn from_lines(a: usize, b: usize) -> Self {
        let (first, last) = if a <= b { (a, b) } else { (b, a) };
        Self {
            start: first,
            count: last - first + 1,
        }
    }
    pub fn last_line(&self) -> usize {
        self.start + self.count - 1
    }
    pub fn lines(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.count
    }
    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line <= self.last_line()
    }
}

/// Errors raised while applying a batch of edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("overlapping edits {first:?} and {second:?}")]
    Overlap { first: Span, second: Span },
}

/// Immutable version of the buffer text.
#[derive(Clone)]
pub struct Snapshot {
    rope: Rope,
    version: u64,
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("version", &self.version)
            .field("len", &self.rope.len_bytes())
            .field("lines", &self.rope.len_lines())
            .finish()
    }
}

impl Snapshot {
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// True when both snapshots hold identical text (versions ignored).
    pub fn same_text(&self, other: &Snapshot) -> bool {
        self.rope == other.rope
    }

    /// Total number of lines. A trailing line break starts a final empty line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn last_line(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    /// Offset of the first byte of `line` (clamped to the last line).
    pub fn line_start(&self, line: usize) -> usize {
        self.rope.line_to_byte(line.min(self.last_line()))
    }

    /// Byte length of a line excluding its line break.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return 0;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_bytes();
        if len > 0 && slice.byte(len - 1) == b'\n' {
            len -= 1;
            if len > 0 && slice.byte(len - 1) == b'\r' {
                len -= 1;
            }
        }
        len
    }

    /// Line content without its line break; empty for out-of-range lines.
    pub fn line(&self, line: usize) -> String {
        if line >= self.line_count() {
            return String::new();
        }
        let start = self.line_start(line);
        self.slice(Span::new(start, start + self.line_len(line)))
    }

    pub fn line_end(&self, line: usize) -> usize {
        self.line_start(line) + self.line_len(line.min(self.last_line()))
    }

    pub fn line_end_including_break(&self, line: usize) -> usize {
        if line + 1 < self.line_count() {
            self.line_start(line + 1)
        } else {
            self.len()
        }
    }

    pub fn line_span(&self, line: usize) -> Span {
        Span::new(self.line_start(line), self.line_end(line))
    }

    pub fn line_span_including_break(&self, line: usize) -> Span {
        Span::new(self.line_start(line), self.line_end_including_break(line))
    }

    /// Span covering every line in `range` including the final line break (if any).
    pub fn line_range_span(&self, range: LineRange) -> Span {
        let last = range.last_line().min(self.last_line());
        Span::new(
            self.line_start(range.start),
            self.line_end_including_break(last),
        )
    }

    /// Up to `count` lines starting at `line`, clamped to the buffer extent.
    pub fn line_range(&self, line: usize, count: usize) -> LineRange {
        let line = line.min(self.last_line());
        let available = self.line_count() - line;
        LineRange::new(line, count.max(1).min(available))
    }

    /// Clamp a possibly stale position onto this snapshot (line, length and char boundary).
    pub fn clamp_position(&self, pos: Position) -> Position {
        let mut p = pos;
        p.clamp_to(self.line_count(), |l| self.line_len(l));
        let content = self.line(p.line);
        while p.byte > 0 && !content.is_char_boundary(p.byte) {
            p.byte -= 1;
        }
        p
    }

    pub fn offset(&self, pos: Position) -> usize {
        let p = self.clamp_position(pos);
        self.line_start(p.line) + p.byte
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len());
        let line = self.rope.byte_to_line(offset);
        let start = self.line_start(line);
        Position::new(line, (offset - start).min(self.line_len(line)))
    }

    /// Return the UTF-8 text of `span` (clamped to the snapshot).
    pub fn slice(&self, span: Span) -> String {
        let total = self.len();
        let s = span.start.min(total);
        let e = span.end.min(total);
        if s >= e {
            return String::new();
        }
        let start_char = self.rope.byte_to_char(s);
        let end_char = self.rope.byte_to_char(e);
        self.rope.slice(start_char..end_char).to_string()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.len() {
            return None;
        }
        Some(self.rope.char(self.rope.byte_to_char(offset)))
    }

    /// Offset just past the character starting at `offset` (or the end of the snapshot).
    pub fn next_char_offset(&self, offset: usize) -> usize {
        match self.char_at(offset) {
            Some(c) => offset + c.len_utf8(),
            None => self.len(),
        }
    }

    /// Offset of the character preceding `offset` (0 at the start).
    pub fn prev_char_offset(&self, offset: usize) -> usize {
        if offset == 0 {
            return 0;
        }
        let char_idx = self.rope.byte_to_char(offset.min(self.len()));
        self.rope.char_to_byte(char_idx.saturating_sub(1))
    }

    /// First non-blank (space / tab) position of `line`, or its end when blank.
    pub fn first_non_blank(&self, line: usize) -> Position {
        let line = line.min(self.last_line());
        let content = self.line(line);
        let byte = content
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(content.len());
        Position::new(line, byte)
    }

    /// Leading run of spaces / tabs of `line`.
    pub fn leading_blank(&self, line: usize) -> String {
        let content = self.line(line);
        content
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect()
    }

    /// Grapheme column of `pos` on its line.
    pub fn column(&self, pos: Position) -> usize {
        let pos = self.clamp_position(pos);
        let content = self.line(pos.line);
        grapheme::iter(&content[..pos.byte]).count()
    }

    /// Byte offset within `line` of grapheme column `column`, clamped to the line end.
    pub fn byte_for_column(&self, line: usize, column: usize) -> usize {
        let content = self.line(line);
        unicode_segmentation::UnicodeSegmentation::grapheme_indices(content.as_str(), true)
            .nth(column)
            .map(|(idx, _)| idx)
            .unwrap_or(content.len())
    }

    /// Number of graphemes on `line`.
    pub fn line_columns(&self, line: usize) -> usize {
        grapheme::iter(&self.line(line)).count()
    }

    /// Visual (terminal cell) column of `pos`.
    pub fn visual_column(&self, pos: Position) -> usize {
        let pos = self.clamp_position(pos);
        grapheme::visual_col(&self.line(pos.line), pos.byte)
    }

    /// Visual column just past the grapheme under `pos`; `pos`'s own column
    /// at the line end.
    pub fn visual_column_after(&self, pos: Position) -> usize {
        let pos = self.clamp_position(pos);
        let content = self.line(pos.line);
        grapheme::visual_col(&content, grapheme::next_boundary(&content, pos.byte))
    }

    /// Visual width of the whole line.
    pub fn line_visual_width(&self, line: usize) -> usize {
        let content = self.line(line);
        grapheme::visual_col(&content, content.len())
    }

    /// Byte offset within `line` of the grapheme covering visual column `target`,
    /// clamped to the line end when the line is shorter.
    pub fn byte_for_visual_column(&self, line: usize, target: usize) -> usize {
        let content = self.line(line);
        let mut col = 0;
        for (b, g) in
            unicode_segmentation::UnicodeSegmentation::grapheme_indices(content.as_str(), true)
        {
            let w = grapheme::cluster_width(g);
            if col + w > target {
                return b;
            }
            col += w;
        }
        content.len()
    }
}

/// Mutable text store owning the current snapshot.
pub struct Buffer {
    pub name: String,
    current: Snapshot,
    next_version: u64,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            current: Snapshot {
                rope: Rope::from_str(content),
                version: 0,
            },
            next_version: 1,
        })
    }

    /// Cheap clone of the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.current.clone()
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    pub fn version(&self) -> u64 {
        self.current.version
    }

    fn commit(&mut self, rope: Rope) -> Snapshot {
        self.current = Snapshot {
            rope,
            version: self.next_version,
        };
        self.next_version += 1;
        self.current.clone()
    }

    pub fn delete(&mut self, span: Span) -> Snapshot {
        self.replace(span, "")
    }

    pub fn insert(&mut self, offset: usize, text: &str) -> Snapshot {
        self.replace(Span::empty(offset), text)
    }

    pub fn replace(&mut self, span: Span, text: &str) -> Snapshot {
        let mut rope = self.current.rope.clone();
        apply_one(&mut rope, span, text);
        self.commit(rope)
    }

    /// Begin a batch of edits expressed against the current snapshot.
    pub fn edit(&mut self) -> BatchEdit<'_> {
        BatchEdit {
            buffer: self,
            edits: Vec::new(),
        }
    }

    /// Make `snapshot`'s text current again (as a new version).
    pub fn restore(&mut self, snapshot: &Snapshot) -> Snapshot {
        self.commit(snapshot.rope.clone())
    }
}

fn apply_one(rope: &mut Rope, span: Span, text: &str) {
    let len = rope.len_bytes();
    let s = span.start.min(len);
    let e = span.end.min(len);
    let start_char = rope.byte_to_char(s);
    let end_char = rope.byte_to_char(e);
    if start_char < end_char {
        rope.remove(start_char..end_char);
    }
    if !text.is_empty() {
        rope.insert(start_char, text);
    }
}

/// Several deletes / replacements applied atomically as one new snapshot.
///
/// All spans refer to the snapshot current when the batch was created.
pub struct BatchEdit<'a> {
    buffer: &'a mut Buffer,
    edits: Vec<(Span, String)>,
}

impl BatchEdit<'_> {
    pub fn delete(&mut self, span: Span) -> &mut Self {
        self.edits.push((span, String::new()));
        self
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>) -> &mut Self {
        self.edits.push((span, text.into()));
        self
    }

    pub fn insert(&mut self, offset: usize, text: impl Into<String>) -> &mut Self {
        self.edits.push((Span::empty(offset), text.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply every queued edit, back to front, producing one new snapshot.
    pub fn apply(self) -> std::result::Result<Snapshot, EditError> {
        let BatchEdit { buffer, mut edits } = self;
        edits.sort_by_key(|(span, _)| span.start);
        for pair in edits.windows(2) {
            let (a, b) = (pair[0].0, pair[1].0);
            if a.end > b.start {
                return Err(EditError::Overlap {
                    first: a,
                    second: b,
                });
            }
        }
        let mut rope = buffer.current.rope.clone();
        for (span, text) in edits.iter().rev() {
            apply_one(&mut rope, *span, text);
        }
        Ok(buffer.commit(rope))
    }
}

/// Grapheme and width utilities. These are pure helpers operating on a single line.
pub mod grapheme {
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    /// Iterate grapheme clusters in a line.
    pub fn iter(line: &str) -> impl Iterator<Item = &str> {
        line.graphemes(true)
    }

    /// Previous grapheme boundary (returns 0 if already at or below 1st boundary).
    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 || byte > line.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (returns line.len() if at or beyond end).
    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    /// Compute visual column (terminal cells) up to (but not including) byte offset.
    pub fn visual_col(line: &str, byte: usize) -> usize {
        let mut col = 0;
        for (idx, g) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            col += cluster_width(g);
        }
        col
    }

    /// Width in terminal cells of this grapheme cluster (never zero for a visible cluster).
    pub fn cluster_width(g: &str) -> usize {
        if g == "\t" {
            return 1;
        }
        g.width().max(1)
    }

    /// Naive word classification: alphanumeric or underscore start.
    pub fn is_word(g: &str) -> bool {
        g.chars()
            .next()
            .map(|c| c == '_' || c.is_alphanumeric())
            .unwrap_or(false)
    }

    pub fn is_blank(c: char) -> bool {
        c == ' ' || c == '\t'
    }
}
