//! Repeat Engine (`.`).
//!
//! Replays the session's last-command slot at the current caret. The whole
//! replay runs inside one transaction on the focused buffer so it undoes as a
//! unit. A linked pair runs left to right: a failing first half stops the
//! second, and a transaction the first half carried into Insert mode is
//! closed before the second half starts. Only the first command of the chain
//! takes the repeat's count.

use tracing::{debug, trace};

use crate::command::{CommandData, ModeSwitch};
use crate::error::CommandError;
use crate::executor::{CommandExecutor, focused_view};
use crate::host::EditorHost;
use crate::insert::{apply_text_change, caret_left_on_exit};
use crate::session::{StoredCommand, TextChange};

impl<H: EditorHost + ?Sized> CommandExecutor<'_, H> {
    pub(crate) fn repeat_last_command(&mut self, data: CommandData) -> Result<ModeSwitch, CommandError> {
        let Some(_guard) = self.session.enter_repeat() else {
            debug!(target: "actions.repeat", "recursive_repeat");
            return Err(CommandError::RecursiveRepeat);
        };
        let stored = self
            .session
            .last_command()
            .cloned()
            .ok_or(CommandError::NothingToRepeat)?;
        let id = self.focused();
        let mut frame = self.open_frames();
        frame.open(id, "repeat")?;
        trace!(target: "actions.repeat", ?stored, count = ?data.count, "repeat_begin");
        let result = frame.replay_stored(&stored, data.count);
        frame.complete()?;
        result?;
        trace!(target: "actions.repeat", "repeat_done");
        Ok(ModeSwitch::NoSwitch)
    }

    fn replay_stored(&mut self, stored: &StoredCommand, count: Option<usize>) -> Result<(), CommandError> {
        for (i, leaf) in stored.leaves().into_iter().enumerate() {
            let count = if i == 0 { count } else { None };
            let switch = match leaf {
                StoredCommand::NormalCommand { command, data } => {
                    self.dispatch_normal(command, data.override_count(count))?
                }
                StoredCommand::VisualCommand {
                    command,
                    data,
                    span,
                } => {
                    let span = {
                        let view = focused_view(self.host)?;
                        span.reconstruct(&view.snapshot(), view.caret())
                    };
                    self.dispatch_visual(command, data.override_count(count), &span)?
                }
                StoredCommand::TextChangeCommand(change) => {
                    self.replay_text_change(change, count)?;
                    ModeSwitch::NoSwitch
                }
                StoredCommand::LinkedCommand(..) => ModeSwitch::NoSwitch,
            };
            if let Some(linked) = switch.linked_transaction()
                && let Some(view) = self.host.view_mut(linked.buffer)
                && view.history().is_open(linked.token)
            {
                trace!(target: "actions.repeat", token = linked.token.id(), "linked_transaction_closed");
                view.complete_transaction_through(linked.token)?;
            }
        }
        Ok(())
    }

    /// Apply a captured insert-mode edit `count` times, then step left the
    /// way leaving Insert mode does.
    fn replay_text_change(&mut self, change: &TextChange, count: Option<usize>) -> Result<(), CommandError> {
        let times = count.unwrap_or(1).max(1);
        let view = focused_view(self.host)?;
        let mut scope = view.undo_scope("repeat text");
        for _ in 0..times {
            apply_text_change(&mut scope, change);
        }
        caret_left_on_exit(&mut scope);
        scope.complete()?;
        trace!(target: "actions.repeat", times, "text_change_replayed");
        Ok(())
    }
}
