#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

//! Scripted host for integration tests.
//!
//! `TestHost` owns a few buffers and decodes a small Vim key language into
//! commands, so tests (and macro replay) drive the core through the same
//! `process_key` path a real editor would.

use std::collections::HashMap;

use core_actions::{
    ChangeCharacterKind, CommandData, CommandExecutor, CommandResult, EditorHost, FoldManager,
    HostError, InsertSession, JoinKind, KeyOutcome, ModeKind, ModeSwitch, Motion, MotionResolver,
    NormalCommand, Session, StatusReporter, TextMotionResolver, VisualCommand, VisualSpan,
};
use core_config::Settings;
use core_events::{KeyCode, KeyInput, parse_keys};
use core_state::{BufferId, OperationKind, RegisterName, Selection, TextView};
use core_text::{Buffer, Position};

#[derive(Debug, Default)]
pub struct RecordingStatus {
    pub errors: Vec<String>,
    pub beeps: usize,
}

impl StatusReporter for RecordingStatus {
    fn on_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
    fn beep(&mut self) {
        self.beeps += 1;
    }
}

pub struct TestHost {
    pub views: HashMap<BufferId, TextView>,
    pub focused: BufferId,
    pub settings: Settings,
    pub status: RecordingStatus,
    pub mode: ModeKind,
    pub host_calls: Vec<String>,
    pub fail_host_ops: bool,
    /// Host operations panic instead of returning.
    pub panic_on_host_ops: bool,
    /// Line -> indent width reported as the engine indent.
    pub engine_indent: HashMap<usize, usize>,
    /// Every key from this index on fails.
    pub fail_after: Option<usize>,
    pub keys_processed: usize,
    resolver: TextMotionResolver,
    insert: Option<InsertSession>,
    pending: Vec<KeyInput>,
    anchor: Option<Position>,
    next_id: u32,
}

pub fn host_with(text: &str) -> TestHost {
    host_with_settings(text, Settings::default())
}

pub fn host_with_settings(text: &str, settings: Settings) -> TestHost {
    let mut host = TestHost {
        views: HashMap::new(),
        focused: BufferId(0),
        settings,
        status: RecordingStatus::default(),
        mode: ModeKind::Normal,
        host_calls: Vec::new(),
        fail_host_ops: false,
        panic_on_host_ops: false,
        engine_indent: HashMap::new(),
        fail_after: None,
        keys_processed: 0,
        resolver: TextMotionResolver,
        insert: None,
        pending: Vec::new(),
        anchor: None,
        next_id: 0,
    };
    let id = host.add_buffer(text);
    host.focused = id;
    host
}

pub fn count(n: usize) -> CommandData {
    CommandData::with_count(n)
}

pub fn register(c: char) -> CommandData {
    CommandData {
        count: None,
        register: RegisterName::from_char(c),
    }
}

impl TestHost {
    pub fn add_buffer(&mut self, text: &str) -> BufferId {
        let id = BufferId(self.next_id);
        self.next_id += 1;
        let buffer = Buffer::from_str(format!("buf{}", id.0), text).expect("buffer");
        self.views.insert(id, TextView::new(id, buffer));
        id
    }

    pub fn focus(&mut self, id: BufferId) {
        self.focused = id;
    }

    pub fn active(&self) -> &TextView {
        self.views.get(&self.focused).expect("focused view")
    }

    pub fn active_mut(&mut self) -> &mut TextView {
        self.views.get_mut(&self.focused).expect("focused view")
    }

    pub fn text(&self) -> String {
        self.active().text()
    }

    pub fn text_of(&self, id: BufferId) -> String {
        self.views[&id].text()
    }

    pub fn caret(&self) -> Position {
        self.active().caret()
    }

    pub fn set_caret(&mut self, line: usize, byte: usize) {
        self.active_mut().move_caret_to(Position::new(line, byte));
    }

    /// Make every key after the next `n` fail.
    pub fn fail_after_next(&mut self, n: usize) {
        self.fail_after = Some(self.keys_processed + n);
    }

    pub fn feed(&mut self, session: &mut Session, keys: &str) -> Vec<KeyOutcome> {
        parse_keys(keys)
            .expect("key notation")
            .into_iter()
            .map(|key| self.process_key(session, key))
            .collect()
    }

    pub fn run(&mut self, session: &mut Session, command: NormalCommand, data: CommandData) -> CommandResult {
        CommandExecutor::new(self, session).run_normal_command(&command, data)
    }

    pub fn run_visual(
        &mut self,
        session: &mut Session,
        command: VisualCommand,
        data: CommandData,
        span: &VisualSpan,
    ) -> CommandResult {
        CommandExecutor::new(self, session).run_visual_command(&command, data, span)
    }

    fn apply_result(&mut self, result: CommandResult) -> KeyOutcome {
        match result {
            CommandResult::Error => {
                if self.mode.is_visual() {
                    self.leave_visual();
                }
                KeyOutcome::Error
            }
            CommandResult::Completed(switch) => {
                self.apply_switch(switch);
                KeyOutcome::Handled
            }
        }
    }

    fn apply_switch(&mut self, switch: ModeSwitch) {
        match switch {
            ModeSwitch::NoSwitch => {}
            ModeSwitch::SwitchMode(ModeKind::Insert) => self.enter_insert(None),
            ModeSwitch::SwitchModeWithArgument(ModeKind::Insert, argument) => {
                self.enter_insert(Some(argument))
            }
            ModeSwitch::SwitchModeWithArgument(kind, _) => self.mode = kind,
            ModeSwitch::SwitchMode(kind) if kind.is_visual() => {
                let caret = self.caret();
                self.anchor = Some(caret);
                self.active_mut().set_selection(Selection {
                    anchor: caret,
                    active: caret,
                });
                self.mode = kind;
            }
            ModeSwitch::SwitchMode(kind) => {
                self.leave_visual();
                self.mode = kind;
            }
            ModeSwitch::SwitchPreviousMode => self.leave_visual(),
        }
    }

    fn enter_insert(&mut self, argument: Option<core_actions::ModeArgument>) {
        let view = self.views.get_mut(&self.focused).expect("focused view");
        self.insert = Some(InsertSession::begin(view, argument));
        self.mode = ModeKind::Insert;
    }

    fn leave_visual(&mut self) {
        self.anchor = None;
        self.active_mut().clear_selection();
        self.mode = ModeKind::Normal;
    }

    fn insert_key(&mut self, session: &mut Session, key: KeyInput) -> KeyOutcome {
        let Some(mut insert) = self.insert.take() else {
            self.mode = ModeKind::Normal;
            return KeyOutcome::Unhandled;
        };
        let view = self
            .views
            .get_mut(&insert.transaction().buffer)
            .expect("insert view");
        match key.code {
            KeyCode::Esc => {
                let finished = insert.finish(view, session);
                self.mode = ModeKind::Normal;
                return match finished {
                    Ok(()) => KeyOutcome::Handled,
                    Err(_) => KeyOutcome::Error,
                };
            }
            KeyCode::Backspace => {
                insert.backspace(view);
            }
            KeyCode::Delete => {
                insert.delete(view);
            }
            _ => match key.as_char() {
                Some(c) => insert.type_text(view, &c.to_string()),
                None => {
                    self.insert = Some(insert);
                    return KeyOutcome::Unhandled;
                }
            },
        }
        self.insert = Some(insert);
        KeyOutcome::Handled
    }

    fn normal_key(&mut self, session: &mut Session) -> KeyOutcome {
        match parse_normal(&self.pending, session.is_recording()) {
            Parsed::Incomplete => KeyOutcome::Pending,
            Parsed::Invalid => {
                self.pending.clear();
                KeyOutcome::Unhandled
            }
            Parsed::Normal(command, data) => {
                // Cleared first: the command may replay keys through this host.
                self.pending.clear();
                let result = CommandExecutor::new(self, session).run_normal_command(&command, data);
                self.apply_result(result)
            }
            Parsed::FocusNext => {
                self.pending.clear();
                self.focus_next();
                KeyOutcome::Handled
            }
            Parsed::Visual(..) | Parsed::ExitVisual => {
                self.pending.clear();
                KeyOutcome::Unhandled
            }
        }
    }

    /// `<C-w>w`: cycle focus through buffers in id order.
    fn focus_next(&mut self) {
        let mut ids: Vec<BufferId> = self.views.keys().copied().collect();
        ids.sort_by_key(|id| id.0);
        if let Some(at) = ids.iter().position(|id| *id == self.focused) {
            self.focused = ids[(at + 1) % ids.len()];
        }
    }

    fn visual_span(&self) -> VisualSpan {
        let view = self.active();
        let kind = match self.mode {
            ModeKind::VisualLine => OperationKind::LineWise,
            ModeKind::VisualBlock => OperationKind::BlockWise,
            _ => OperationKind::CharacterWise,
        };
        let selection = Selection {
            anchor: self.anchor.unwrap_or(view.caret()),
            active: view.caret(),
        };
        VisualSpan::from_selection(&view.snapshot(), selection, kind)
    }

    fn visual_key(&mut self, session: &mut Session) -> KeyOutcome {
        match parse_visual(&self.pending) {
            Parsed::Incomplete => KeyOutcome::Pending,
            Parsed::Invalid => {
                self.pending.clear();
                KeyOutcome::Unhandled
            }
            Parsed::ExitVisual => {
                self.pending.clear();
                self.leave_visual();
                KeyOutcome::Handled
            }
            Parsed::FocusNext => {
                self.pending.clear();
                KeyOutcome::Unhandled
            }
            Parsed::Normal(command, data) => {
                self.pending.clear();
                if let NormalCommand::SwitchMode(kind) = command {
                    if kind == self.mode {
                        self.leave_visual();
                    } else {
                        self.mode = kind;
                    }
                    return KeyOutcome::Handled;
                }
                let result = CommandExecutor::new(self, session).run_normal_command(&command, data);
                let caret = self.caret();
                let anchor = self.anchor.unwrap_or(caret);
                self.active_mut().set_selection(Selection {
                    anchor,
                    active: caret,
                });
                match result {
                    CommandResult::Error => KeyOutcome::Error,
                    CommandResult::Completed(_) => KeyOutcome::Handled,
                }
            }
            Parsed::Visual(command, data) => {
                self.pending.clear();
                let span = self.visual_span();
                let result =
                    CommandExecutor::new(self, session).run_visual_command(&command, data, &span);
                self.apply_result(result)
            }
        }
    }
}

impl EditorHost for TestHost {
    fn focused_buffer(&self) -> BufferId {
        self.focused
    }

    fn view(&self, id: BufferId) -> Option<&TextView> {
        self.views.get(&id)
    }

    fn view_mut(&mut self, id: BufferId) -> Option<&mut TextView> {
        self.views.get_mut(&id)
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn motion_resolver(&self) -> &dyn MotionResolver {
        &self.resolver
    }

    fn fold_manager(&mut self, id: BufferId) -> Option<&mut dyn FoldManager> {
        self.views
            .get_mut(&id)
            .map(|view| view.folds_mut() as &mut dyn FoldManager)
    }

    fn status(&mut self) -> &mut dyn StatusReporter {
        &mut self.status
    }

    fn engine_indent(&self, _id: BufferId, line: usize) -> Option<usize> {
        self.engine_indent.get(&line).copied()
    }

    fn process_key(&mut self, session: &mut Session, key: KeyInput) -> KeyOutcome {
        session.record_key(key);
        let index = self.keys_processed;
        self.keys_processed += 1;
        if self.fail_after.is_some_and(|limit| index >= limit) {
            self.pending.clear();
            return KeyOutcome::Error;
        }
        match self.mode {
            ModeKind::Insert | ModeKind::Replace => self.insert_key(session, key),
            mode => {
                self.pending.push(key);
                if mode.is_visual() {
                    self.visual_key(session)
                } else {
                    self.normal_key(session)
                }
            }
        }
    }

    fn write_buffer_and_quit(&mut self, id: BufferId) -> Result<(), HostError> {
        self.host_op("write_quit", id)
    }

    fn close_buffer(&mut self, id: BufferId) -> Result<(), HostError> {
        self.host_op("close", id)
    }

    fn split_view_horizontally(&mut self, id: BufferId) -> Result<(), HostError> {
        self.host_op("split_horizontal", id)
    }

    fn split_view_vertically(&mut self, id: BufferId) -> Result<(), HostError> {
        self.host_op("split_vertical", id)
    }
}

impl TestHost {
    fn host_op(&mut self, name: &str, id: BufferId) -> Result<(), HostError> {
        if self.panic_on_host_ops {
            panic!("host operation {name} crashed");
        }
        if self.fail_host_ops {
            return Err(HostError::Unsaved);
        }
        self.host_calls.push(format!("{name}:{}", id.0));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Key decoding
// ---------------------------------------------------------------------------

pub enum Parsed {
    Incomplete,
    Invalid,
    Normal(NormalCommand, CommandData),
    Visual(VisualCommand, CommandData),
    ExitVisual,
    FocusNext,
}

struct Keys<'k> {
    keys: &'k [KeyInput],
    at: usize,
}

impl Keys<'_> {
    fn next(&mut self) -> Option<KeyInput> {
        let key = self.keys.get(self.at).copied();
        self.at += 1;
        key
    }
}

fn ch(key: &KeyInput) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if key.mods.is_empty() => Some(c),
        _ => None,
    }
}

fn ctrl(key: &KeyInput) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if key.mods == core_events::KeyModifiers::CTRL => Some(c),
        _ => None,
    }
}

macro_rules! next_key {
    ($keys:expr) => {
        match $keys.next() {
            Some(key) => key,
            None => return Parsed::Incomplete,
        }
    };
}

macro_rules! next_char {
    ($keys:expr) => {
        match ch(&next_key!($keys)) {
            Some(c) => c,
            None => return Parsed::Invalid,
        }
    };
}

enum MotionParse {
    Done(Motion),
    Incomplete,
    Invalid,
}

fn parse_motion(key: KeyInput, keys: &mut Keys<'_>) -> MotionParse {
    let motion = match ch(&key) {
        Some('h') => Motion::CharLeft,
        Some('l') => Motion::CharRight,
        Some('k') => Motion::LineUp,
        Some('j') => Motion::LineDown,
        Some('w') => Motion::WordForward,
        Some('b') => Motion::WordBackward,
        Some('e') => Motion::EndOfWord,
        Some('0') => Motion::BeginningOfLine,
        Some('^') => Motion::FirstNonBlank,
        Some('$') => Motion::EndOfLine,
        Some('G') => Motion::LastLine,
        Some('g') => match keys.next() {
            None => return MotionParse::Incomplete,
            Some(k) if ch(&k) == Some('g') => Motion::FirstLine,
            Some(_) => return MotionParse::Invalid,
        },
        _ => return MotionParse::Invalid,
    };
    MotionParse::Done(motion)
}

/// Optional `"x` register and count, then the first command key.
fn prefix(keys: &mut Keys<'_>, data: &mut CommandData) -> Result<KeyInput, Parsed> {
    let mut key = keys.next().ok_or(Parsed::Incomplete)?;
    if ch(&key) == Some('"') {
        let name = keys.next().ok_or(Parsed::Incomplete)?;
        data.register = Some(
            ch(&name)
                .and_then(RegisterName::from_char)
                .ok_or(Parsed::Invalid)?,
        );
        key = keys.next().ok_or(Parsed::Incomplete)?;
    }
    let (count, key) = digits(keys, key)?;
    data.count = count;
    Ok(key)
}

fn digits(keys: &mut Keys<'_>, mut key: KeyInput) -> Result<(Option<usize>, KeyInput), Parsed> {
    let mut count: Option<usize> = None;
    while let Some(d) = ch(&key)
        .and_then(|c| c.to_digit(10))
        .filter(|d| *d > 0 || count.is_some())
    {
        count = Some(count.unwrap_or(0) * 10 + d as usize);
        key = keys.next().ok_or(Parsed::Incomplete)?;
    }
    Ok((count, key))
}

fn operator_motion(keys: &mut Keys<'_>, data: &mut CommandData) -> Result<Motion, Parsed> {
    let key = keys.next().ok_or(Parsed::Incomplete)?;
    let (motion_count, key) = digits(keys, key)?;
    if data.count.is_some() || motion_count.is_some() {
        data.count = Some(data.count.unwrap_or(1) * motion_count.unwrap_or(1));
    }
    match parse_motion(key, keys) {
        MotionParse::Done(motion) => Ok(motion),
        MotionParse::Incomplete => Err(Parsed::Incomplete),
        MotionParse::Invalid => Err(Parsed::Invalid),
    }
}

pub fn parse_normal(pending: &[KeyInput], recording: bool) -> Parsed {
    use NormalCommand as N;
    let mut keys = Keys { keys: pending, at: 0 };
    let mut data = CommandData::default();
    let key = match prefix(&mut keys, &mut data) {
        Ok(key) => key,
        Err(parsed) => return parsed,
    };
    if key.code == KeyCode::Esc {
        return Parsed::Invalid;
    }
    if let Some(c) = ctrl(&key) {
        let command = match c {
            'r' => N::Redo,
            'v' => N::SwitchMode(ModeKind::VisualBlock),
            'w' => match next_char!(keys) {
                's' => N::SplitViewHorizontally,
                'v' => N::SplitViewVertically,
                'w' => return Parsed::FocusNext,
                _ => return Parsed::Invalid,
            },
            _ => return Parsed::Invalid,
        };
        return Parsed::Normal(command, data);
    }
    let Some(c) = ch(&key) else {
        return Parsed::Invalid;
    };
    let command = match c {
        'd' | 'c' | 'y' | '>' | '<' => {
            let save = keys.at;
            if keys.next().and_then(|k| ch(&k)) == Some(c) {
                match c {
                    'd' => N::DeleteLines,
                    'c' => N::ChangeLines,
                    'y' => N::YankLines,
                    '>' => N::ShiftLinesRight,
                    _ => N::ShiftLinesLeft,
                }
            } else {
                keys.at = save;
                let motion = match operator_motion(&mut keys, &mut data) {
                    Ok(m) => m,
                    Err(parsed) => return parsed,
                };
                match c {
                    'd' => N::DeleteMotion(motion),
                    'c' => N::ChangeMotion(motion),
                    'y' => N::Yank(motion),
                    '>' => N::ShiftMotionLinesRight(motion),
                    _ => N::ShiftMotionLinesLeft(motion),
                }
            }
        }
        'x' => N::DeleteCharacterAtCaret,
        'X' => N::DeleteCharacterBeforeCaret,
        'D' => N::DeleteTillEndOfLine,
        'C' => N::ChangeTillEndOfLine,
        's' => N::SubstituteCharacterAtCaret,
        'p' => N::PutAfterCaret {
            move_caret_after_text: false,
        },
        'P' => N::PutBeforeCaret {
            move_caret_after_text: false,
        },
        'J' => N::JoinLines(JoinKind::RemoveEmptySpaces),
        '~' => N::ChangeCaseCaretPoint(ChangeCharacterKind::ToggleCase),
        'r' => N::ReplaceChar(next_key!(keys)),
        'i' => N::InsertAtCaret,
        'a' => N::InsertAfterCaret,
        'A' => N::InsertAtEndOfLine,
        'I' => N::InsertAtFirstNonBlank,
        'o' => N::InsertLineBelow,
        'O' => N::InsertLineAbove,
        'u' => N::Undo,
        '.' => N::RepeatLastCommand,
        'q' if recording => N::RecordMacroStop,
        'q' => N::RecordMacroStart(next_char!(keys)),
        '@' => N::RunMacro(next_char!(keys)),
        'm' => N::SetMarkToCaret(next_char!(keys)),
        '`' => N::JumpToMark(next_char!(keys)),
        '\'' => N::JumpToMarkLine(next_char!(keys)),
        'v' => N::SwitchMode(ModeKind::VisualCharacter),
        'V' => N::SwitchMode(ModeKind::VisualLine),
        'g' => match next_char!(keys) {
            'g' => N::MoveCaretToMotion(Motion::FirstLine),
            'p' => N::PutAfterCaret {
                move_caret_after_text: true,
            },
            'P' => N::PutBeforeCaret {
                move_caret_after_text: true,
            },
            'J' => N::JoinLines(JoinKind::KeepEmptySpaces),
            op @ ('~' | 'u' | 'U') => {
                let kind = match op {
                    '~' => ChangeCharacterKind::ToggleCase,
                    'u' => ChangeCharacterKind::ToLowerCase,
                    _ => ChangeCharacterKind::ToUpperCase,
                };
                match operator_motion(&mut keys, &mut data) {
                    Ok(motion) => N::ChangeCaseMotion(kind, motion),
                    Err(parsed) => return parsed,
                }
            }
            _ => return Parsed::Invalid,
        },
        ']' | '[' => match next_char!(keys) {
            'p' if c == ']' => N::PutAfterCaretWithIndent,
            'p' => N::PutBeforeCaretWithIndent,
            _ => return Parsed::Invalid,
        },
        'z' => match next_char!(keys) {
            'f' => match operator_motion(&mut keys, &mut data) {
                Ok(motion) => N::FoldMotion(motion),
                Err(parsed) => return parsed,
            },
            'F' => N::FoldLines,
            'o' => N::OpenFoldUnderCaret,
            'c' => N::CloseFoldUnderCaret,
            'O' => N::OpenAllFoldsUnderCaret,
            'C' => N::CloseAllFoldsUnderCaret,
            'd' => N::DeleteFoldUnderCaret,
            'D' => N::DeleteAllFoldsUnderCaret,
            'E' => N::DeleteAllFoldsInBuffer,
            _ => return Parsed::Invalid,
        },
        'Z' => match next_char!(keys) {
            'Z' => N::WriteBufferAndQuit,
            'Q' => N::CloseBuffer,
            _ => return Parsed::Invalid,
        },
        _ => match parse_motion(key, &mut keys) {
            MotionParse::Done(motion) => N::MoveCaretToMotion(motion),
            MotionParse::Incomplete => return Parsed::Incomplete,
            MotionParse::Invalid => return Parsed::Invalid,
        },
    };
    Parsed::Normal(command, data)
}

pub fn parse_visual(pending: &[KeyInput]) -> Parsed {
    use VisualCommand as V;
    let mut keys = Keys { keys: pending, at: 0 };
    let mut data = CommandData::default();
    let key = match prefix(&mut keys, &mut data) {
        Ok(key) => key,
        Err(parsed) => return parsed,
    };
    if key.code == KeyCode::Esc {
        return Parsed::ExitVisual;
    }
    if ctrl(&key) == Some('v') {
        return Parsed::Normal(NormalCommand::SwitchMode(ModeKind::VisualBlock), data);
    }
    let Some(c) = ch(&key) else {
        return Parsed::Invalid;
    };
    let command = match c {
        'd' | 'x' => V::DeleteSelection,
        'D' | 'X' => V::DeleteLineSelection,
        'c' | 's' => V::ChangeSelection,
        'C' | 'S' | 'R' => V::ChangeLineSelection,
        'y' => V::YankSelection,
        'Y' => V::YankLineSelection,
        'p' | 'P' => V::PutOverSelection {
            move_caret_after_text: false,
        },
        'J' => V::JoinSelection(JoinKind::RemoveEmptySpaces),
        'r' => V::ReplaceSelection(next_key!(keys)),
        '>' => V::ShiftLinesRight,
        '<' => V::ShiftLinesLeft,
        '~' => V::ChangeCase(ChangeCharacterKind::ToggleCase),
        'u' => V::ChangeCase(ChangeCharacterKind::ToLowerCase),
        'U' => V::ChangeCase(ChangeCharacterKind::ToUpperCase),
        'v' => return Parsed::Normal(NormalCommand::SwitchMode(ModeKind::VisualCharacter), data),
        'V' => return Parsed::Normal(NormalCommand::SwitchMode(ModeKind::VisualLine), data),
        'g' => match next_char!(keys) {
            'J' => V::JoinSelection(JoinKind::KeepEmptySpaces),
            'g' => {
                return Parsed::Normal(NormalCommand::MoveCaretToMotion(Motion::FirstLine), data);
            }
            _ => return Parsed::Invalid,
        },
        'z' => match next_char!(keys) {
            'f' => V::FoldSelection,
            'D' => V::DeleteAllFoldsInSelection,
            _ => return Parsed::Invalid,
        },
        _ => {
            return match parse_motion(key, &mut keys) {
                MotionParse::Done(motion) => {
                    Parsed::Normal(NormalCommand::MoveCaretToMotion(motion), data)
                }
                MotionParse::Incomplete => Parsed::Incomplete,
                MotionParse::Invalid => Parsed::Invalid,
            };
        }
    };
    Parsed::Visual(command, data)
}
