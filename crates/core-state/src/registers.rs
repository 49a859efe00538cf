//! Register store.
//!
//! Slots hold a [`RegisterValue`] (text plus operation kind). Every write
//! replaces the slot; there is no append mode, and uppercase names alias
//! their lowercase slot. Writes aimed at the unnamed register also maintain
//! the numbered ring and the small-delete register the way Vim does.

use tracing::trace;

/// Classifies an edit (or register payload) as character run, whole lines, or rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationKind {
    #[default]
    CharacterWise,
    LineWise,
    BlockWise,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringData {
    Simple(String),
    /// One entry per block row.
    Block(Vec<String>),
}

impl StringData {
    /// Text form; block rows are joined with line breaks.
    pub fn text(&self) -> String {
        match self {
            StringData::Simple(s) => s.clone(),
            StringData::Block(rows) => rows.join("\n"),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            StringData::Simple(s) => s.is_empty(),
            StringData::Block(rows) => rows.iter().all(String::is_empty),
        }
    }
}

impl Default for StringData {
    fn default() -> Self {
        StringData::Simple(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterValue {
    pub data: StringData,
    pub kind: OperationKind,
}

impl RegisterValue {
    pub fn new(data: StringData, kind: OperationKind) -> Self {
        Self { data, kind }
    }

    pub fn characters(text: impl Into<String>) -> Self {
        Self::new(StringData::Simple(text.into()), OperationKind::CharacterWise)
    }

    /// Whole lines; `text` should end with a line break.
    pub fn lines(text: impl Into<String>) -> Self {
        Self::new(StringData::Simple(text.into()), OperationKind::LineWise)
    }

    pub fn block(rows: Vec<String>) -> Self {
        Self::new(StringData::Block(rows), OperationKind::BlockWise)
    }

    pub fn text(&self) -> String {
        self.data.text()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOperation {
    Yank,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterName {
    /// `"`
    Unnamed,
    /// `a`..=`z` (stored lowercase)
    Named(char),
    /// `0`..=`9`
    Numbered(u8),
    /// `-`
    SmallDelete,
    /// `_`
    Blackhole,
}

impl RegisterName {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '"' => Some(Self::Unnamed),
            '-' => Some(Self::SmallDelete),
            '_' => Some(Self::Blackhole),
            c if c.is_ascii_alphabetic() => Some(Self::Named(c.to_ascii_lowercase())),
            c if c.is_ascii_digit() => Some(Self::Numbered(c as u8 - b'0')),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Unnamed => '"',
            Self::Named(c) => *c,
            Self::Numbered(n) => (b'0' + n) as char,
            Self::SmallDelete => '-',
            Self::Blackhole => '_',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub name: RegisterName,
    pub value: RegisterValue,
}

#[derive(Debug, Default, Clone)]
pub struct RegisterStore {
    unnamed: RegisterValue,
    named: [RegisterValue; 26],
    numbered: [RegisterValue; 10],
    small_delete: RegisterValue,
}

impl RegisterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone-on-read lookup. Unset and blackhole registers read as empty text.
    pub fn get_register(&self, name: RegisterName) -> Register {
        let value = match name {
            RegisterName::Unnamed => self.unnamed.clone(),
            RegisterName::Named(c) => Self::named_index(c)
                .map(|i| self.named[i].clone())
                .unwrap_or_default(),
            RegisterName::Numbered(n) => self
                .numbered
                .get(n as usize)
                .cloned()
                .unwrap_or_default(),
            RegisterName::SmallDelete => self.small_delete.clone(),
            RegisterName::Blackhole => RegisterValue::default(),
        };
        Register { name, value }
    }

    pub fn set_register_value(
        &mut self,
        name: RegisterName,
        operation: RegisterOperation,
        value: RegisterValue,
    ) {
        trace!(target: "state.registers", register = %name.as_char(), ?operation, kind = ?value.kind, len = value.text().len(), "register_write");
        match name {
            RegisterName::Blackhole => {}
            RegisterName::Named(c) => {
                if let Some(i) = Self::named_index(c) {
                    self.named[i] = value;
                }
            }
            RegisterName::Numbered(n) => {
                if let Some(slot) = self.numbered.get_mut(n as usize) {
                    *slot = value;
                }
            }
            RegisterName::SmallDelete => self.small_delete = value,
            RegisterName::Unnamed => {
                match operation {
                    RegisterOperation::Yank => self.numbered[0] = value.clone(),
                    RegisterOperation::Delete
                        if value.kind == OperationKind::LineWise || value.text().contains('\n') =>
                    {
                        self.numbered.rotate_right(1);
                        // slot 0 belongs to yanks; the rotation pushed the oldest delete into it
                        self.numbered.swap(0, 1);
                        self.numbered[1] = value.clone();
                    }
                    RegisterOperation::Delete => self.small_delete = value.clone(),
                }
                self.unnamed = value;
            }
        }
    }

    fn named_index(c: char) -> Option<usize> {
        let c = c.to_ascii_lowercase();
        c.is_ascii_lowercase().then(|| (c as u8 - b'a') as usize)
    }
}
