//! Macro Engine (`q` / `@`).
//!
//! Recording captures keys from the live pipeline (`Session::record_key`)
//! and stores them in a register as key notation. Replay feeds the keys back
//! through `EditorHost::process_key`, the same entry point live input uses,
//! so a replayed key may change the focused buffer. Each buffer the macro
//! touches gets one transaction, opened on first touch and closed when the
//! invocation ends. A key that fails stops the replay; earlier edits stay.

use core_events::{KeyInput, format_keys, parse_keys};
use core_state::{RegisterName, RegisterOperation, RegisterValue};
use tracing::{debug, trace};

use crate::command::{CommandData, ModeSwitch};
use crate::error::CommandError;
use crate::executor::{CommandExecutor, OpenFrames};
use crate::host::{EditorHost, KeyOutcome};

/// Nesting limit for macros that run macros.
pub const MAX_MACRO_DEPTH: usize = 100;

fn macro_register(c: char) -> Result<RegisterName, CommandError> {
    match RegisterName::from_char(c) {
        Some(name @ (RegisterName::Named(_) | RegisterName::Numbered(_) | RegisterName::Unnamed)) => {
            Ok(name)
        }
        _ => Err(CommandError::InvalidRegister(c)),
    }
}

impl<H: EditorHost + ?Sized> CommandExecutor<'_, H> {
    pub(crate) fn record_macro_start(&mut self, register: char) -> Result<ModeSwitch, CommandError> {
        let name = macro_register(register)?;
        self.session.start_recording(name)?;
        Ok(ModeSwitch::NoSwitch)
    }

    pub(crate) fn record_macro_stop(&mut self) -> Result<ModeSwitch, CommandError> {
        let (name, keys) = self.session.stop_recording()?;
        let text = format_keys(&keys);
        trace!(target: "actions.macro", register = %name.as_char(), keys = keys.len(), %text, "macro_stored");
        self.write_register(name, RegisterOperation::Yank, RegisterValue::characters(text));
        Ok(ModeSwitch::NoSwitch)
    }

    /// `@x` runs register `x` `count` times; `@@` reruns the last one.
    pub(crate) fn run_macro(&mut self, register: char, data: CommandData) -> Result<ModeSwitch, CommandError> {
        let register = match register {
            '@' => self.session.last_macro().ok_or(CommandError::NoPreviousMacro)?,
            c => c,
        };
        let name = macro_register(register)?;
        if self.session.replay_depth() >= MAX_MACRO_DEPTH {
            return Err(CommandError::MacroTooDeep);
        }
        let text = self.session.registers.get_register(name).value.text();
        if text.is_empty() {
            return Err(CommandError::EmptyRegister(register));
        }
        let keys = parse_keys(&text)?;
        self.session.set_last_macro(register);
        let count = data.count_or_default();
        debug!(target: "actions.macro", register = %register, count, keys = keys.len(), "macro_run");

        let mut frames = self.open_frames();
        frames.begin_replay();
        let outcome = replay_keys(&mut frames, &keys, count);
        let closed = frames.complete();
        outcome?;
        closed?;
        Ok(ModeSwitch::NoSwitch)
    }
}

/// Feed `keys` through the live pipeline `count` times, opening a frame on
/// each buffer the first time it has focus.
fn replay_keys<H: EditorHost + ?Sized>(
    frames: &mut OpenFrames<'_, '_, H>,
    keys: &[KeyInput],
    count: usize,
) -> Result<(), CommandError> {
    for (step, key) in std::iter::repeat_n(keys, count).flatten().enumerate() {
        let id = frames.host.focused_buffer();
        if !frames.holds(id) && frames.host.view(id).is_some() {
            frames.open(id, "macro")?;
        }
        let exec = &mut **frames;
        match exec.host.process_key(exec.session, *key) {
            KeyOutcome::Handled | KeyOutcome::Pending => {}
            outcome @ (KeyOutcome::Unhandled | KeyOutcome::Error) => {
                debug!(target: "actions.macro", step, key = %key, ?outcome, "macro_aborted");
                return Err(CommandError::MacroAborted);
            }
        }
    }
    Ok(())
}
