//! Everything the executor needs from the surrounding editor.

use core_config::Settings;
use core_events::KeyInput;
use core_state::{BufferId, FoldManager, TextView};
use thiserror::Error;

use crate::motion::MotionResolver;
use crate::session::Session;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("E37: No write since last change")]
    Unsaved,
    #[error("write failed: {0}")]
    Write(String),
    #[error("{0}")]
    Other(String),
}

/// User-facing feedback channel.
pub trait StatusReporter {
    fn on_error(&mut self, message: &str);
    fn beep(&mut self);
}

/// How the live key pipeline disposed of one keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    /// Consumed as part of an incomplete command (`d` waiting for a motion).
    Pending,
    Unhandled,
    Error,
}

pub trait EditorHost {
    fn focused_buffer(&self) -> BufferId;
    fn view(&self, id: BufferId) -> Option<&TextView>;
    fn view_mut(&mut self, id: BufferId) -> Option<&mut TextView>;
    fn settings(&self) -> &Settings;
    fn motion_resolver(&self) -> &dyn MotionResolver;
    fn fold_manager(&mut self, id: BufferId) -> Option<&mut dyn FoldManager>;
    fn status(&mut self) -> &mut dyn StatusReporter;

    /// Indent width the host's language support suggests for `line`.
    fn engine_indent(&self, _id: BufferId, _line: usize) -> Option<usize> {
        None
    }

    /// Feed one key through the same pipeline live input uses.
    fn process_key(&mut self, session: &mut Session, key: KeyInput) -> KeyOutcome;

    fn write_buffer_and_quit(&mut self, id: BufferId) -> Result<(), HostError>;
    fn close_buffer(&mut self, id: BufferId) -> Result<(), HostError>;
    fn split_view_horizontally(&mut self, id: BufferId) -> Result<(), HostError>;
    fn split_view_vertically(&mut self, id: BufferId) -> Result<(), HostError>;
}
