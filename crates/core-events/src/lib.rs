//! Keystroke model shared by the command core and its hosts.
//!
//! `KeyInput` is the unit replayed by macros and captured by `r{char}`-style
//! commands. Registers only hold text, so recorded keystrokes round-trip
//! through a Vim-style key notation (`<Esc>`, `<C-r>`, `<lt>`).

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// KeyCode enumerates normalized logical key representations consumed by higher layers.
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Delete,
    Up,
    Down,
    Left,
    Right,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyInput {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::empty())
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    pub fn named(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    /// Printable character carried by this key, if it has no modifiers.
    pub fn as_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c) if self.mods.is_empty() => Some(c),
            KeyCode::Tab if self.mods.is_empty() => Some('\t'),
            KeyCode::Enter if self.mods.is_empty() => Some('\n'),
            _ => None,
        }
    }

    /// Text this key inserts when typed literally (`r<CR>` replaces with a line break).
    pub fn literal_text(&self) -> Option<String> {
        self.as_char().map(String::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("unterminated key notation starting at {0}")]
    Unterminated(usize),
    #[error("unknown key notation <{0}>")]
    Unknown(String),
}

fn named_notation(code: KeyCode) -> Option<&'static str> {
    Some(match code {
        KeyCode::Enter => "CR",
        KeyCode::Esc => "Esc",
        KeyCode::Backspace => "BS",
        KeyCode::Tab => "Tab",
        KeyCode::Delete => "Del",
        KeyCode::Up => "Up",
        KeyCode::Down => "Down",
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
        KeyCode::Char(_) => return None,
    })
}

fn parse_named(name: &str) -> Option<KeyCode> {
    let code = match name.to_ascii_lowercase().as_str() {
        "cr" | "enter" | "return" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "bs" | "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "del" | "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "lt" => KeyCode::Char('<'),
        "space" => KeyCode::Char(' '),
        _ => return None,
    };
    Some(code)
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prefix = String::new();
        if self.mods.contains(KeyModifiers::CTRL) {
            prefix.push_str("C-");
        }
        if self.mods.contains(KeyModifiers::ALT) {
            prefix.push_str("A-");
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            prefix.push_str("S-");
        }
        match (self.code, named_notation(self.code)) {
            (KeyCode::Char(c), _) if prefix.is_empty() => {
                if c == '<' {
                    f.write_str("<lt>")
                } else {
                    write!(f, "{c}")
                }
            }
            (KeyCode::Char(c), _) => {
                let c = if c == '<' { "lt".to_string() } else { c.to_string() };
                write!(f, "<{prefix}{c}>")
            }
            (_, Some(name)) => write!(f, "<{prefix}{name}>"),
            (_, None) => Ok(()),
        }
    }
}

/// Render a key sequence in key notation.
pub fn format_keys(keys: &[KeyInput]) -> String {
    keys.iter().map(ToString::to_string).collect()
}

/// Parse key notation back into keystrokes. A `<` that does not start a
/// recognised `<...>` group is taken literally.
pub fn parse_keys(text: &str) -> Result<Vec<KeyInput>, NotationError> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == '<'
            && let Some(close) = rest.find('>')
        {
            let inner = &rest[1..close];
            if let Some(key) = parse_group(inner) {
                out.push(key);
                rest = &rest[close + 1..];
                continue;
            }
        }
        if c == '\n' {
            out.push(KeyInput::named(KeyCode::Enter));
        } else if c == '\u{1b}' {
            out.push(KeyInput::named(KeyCode::Esc));
        } else {
            out.push(KeyInput::char(c));
        }
        rest = &rest[c.len_utf8()..];
    }
    Ok(out)
}

fn parse_group(inner: &str) -> Option<KeyInput> {
    if inner.is_empty() || inner.contains('<') {
        return None;
    }
    let mut mods = KeyModifiers::empty();
    let mut body = inner;
    loop {
        let lower = body.to_ascii_lowercase();
        if body.len() > 2 && lower.starts_with("c-") {
            mods |= KeyModifiers::CTRL;
        } else if body.len() > 2 && (lower.starts_with("a-") || lower.starts_with("m-")) {
            mods |= KeyModifiers::ALT;
        } else if body.len() > 2 && lower.starts_with("s-") {
            mods |= KeyModifiers::SHIFT;
        } else {
            break;
        }
        body = &body[2..];
    }
    let mut chars = body.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && !mods.is_empty()
    {
        return Some(KeyInput::new(KeyCode::Char(c), mods));
    }
    parse_named(body).map(|code| KeyInput::new(code, mods))
}

/// Strict variant used when a group must be recognised.
pub fn parse_key(notation: &str) -> Result<KeyInput, NotationError> {
    let trimmed = notation
        .strip_prefix('<')
        .ok_or_else(|| NotationError::Unknown(notation.to_string()))?;
    let inner = trimmed
        .strip_suffix('>')
        .ok_or(NotationError::Unterminated(0))?;
    parse_group(inner).ok_or_else(|| NotationError::Unknown(inner.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_characters_round_trip() {
        let keys = parse_keys("dd").unwrap();
        assert_eq!(keys, vec![KeyInput::char('d'), KeyInput::char('d')]);
        assert_eq!(format_keys(&keys), "dd");
    }

    #[test]
    fn named_and_chord_notation() {
        let keys = parse_keys("ihi<Esc><C-r>x<lt>").unwrap();
        assert_eq!(
            keys,
            vec![
                KeyInput::char('i'),
                KeyInput::char('h'),
                KeyInput::char('i'),
                KeyInput::named(KeyCode::Esc),
                KeyInput::ctrl('r'),
                KeyInput::char('x'),
                KeyInput::char('<'),
            ]
        );
        assert_eq!(format_keys(&keys), "ihi<Esc><C-r>x<lt>");
    }

    #[test]
    fn unrecognised_group_is_literal() {
        let keys = parse_keys("a<b").unwrap();
        assert_eq!(
            keys,
            vec![KeyInput::char('a'), KeyInput::char('<'), KeyInput::char('b')]
        );
        let keys = parse_keys("<foo>").unwrap();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn strict_parse_reports_unknown() {
        assert_eq!(parse_key("<Esc>").unwrap(), KeyInput::named(KeyCode::Esc));
        assert!(matches!(parse_key("<nope>"), Err(NotationError::Unknown(_))));
    }

    #[test]
    fn literal_text_for_enter_is_line_break() {
        assert_eq!(
            KeyInput::named(KeyCode::Enter).literal_text().as_deref(),
            Some("\n")
        );
        assert_eq!(KeyInput::ctrl('x').literal_text(), None);
    }
}
