//! Transactions that stay open across several dispatches.
//!
//! Repeat, macro replay and put-over-selection run other handlers inside one
//! enclosing frame per buffer. `OpenFrames` borrows the executor for that
//! stretch and closes whatever is still open when it goes away, including
//! while a panic unwinds.

use std::ops::{Deref, DerefMut};

use core_state::{BufferId, LinkedTransaction, UndoError};
use tracing::{trace, warn};

use crate::error::CommandError;
use crate::executor::CommandExecutor;
use crate::host::EditorHost;

pub(crate) struct OpenFrames<'e, 'a, H: EditorHost + ?Sized> {
    exec: &'e mut CommandExecutor<'a, H>,
    open: Vec<LinkedTransaction>,
    replaying: bool,
}

impl<'a, H: EditorHost + ?Sized> CommandExecutor<'a, H> {
    pub(crate) fn open_frames(&mut self) -> OpenFrames<'_, 'a, H> {
        OpenFrames {
            exec: self,
            open: Vec::new(),
            replaying: false,
        }
    }
}

impl<H: EditorHost + ?Sized> OpenFrames<'_, '_, H> {
    /// Open a frame on `id` unless this guard already holds one there.
    pub(crate) fn open(&mut self, id: BufferId, name: &str) -> Result<(), CommandError> {
        if self.holds(id) {
            return Ok(());
        }
        let view = self
            .exec
            .host
            .view_mut(id)
            .ok_or(CommandError::MissingBuffer(id))?;
        let token = view.begin_transaction(name);
        trace!(target: "actions.dispatch", buffer = id.0, token = token.id(), name, "frame_open");
        self.open.push(LinkedTransaction { buffer: id, token });
        Ok(())
    }

    pub(crate) fn holds(&self, id: BufferId) -> bool {
        self.open.iter().any(|t| t.buffer == id)
    }

    /// Mark the session as replaying a macro until the guard closes.
    pub(crate) fn begin_replay(&mut self) {
        self.exec.session.begin_replay();
        self.replaying = true;
    }

    /// Close every frame, newest first. The first close failure is returned
    /// after the rest have been attempted.
    pub(crate) fn complete(mut self) -> Result<(), CommandError> {
        self.close_all().map_err(CommandError::from)
    }

    fn close_all(&mut self) -> Result<(), UndoError> {
        if std::mem::take(&mut self.replaying) {
            self.exec.session.end_replay();
        }
        let mut first = None;
        while let Some(tx) = self.open.pop() {
            let Some(view) = self.exec.host.view_mut(tx.buffer) else {
                continue;
            };
            if !view.history().is_open(tx.token) {
                continue;
            }
            if let Err(e) = view.complete_transaction_through(tx.token) {
                warn!(target: "actions.dispatch", buffer = tx.buffer.0, error = %e, "frame_close_failed");
                first.get_or_insert(e);
            }
        }
        first.map_or(Ok(()), Err)
    }
}

impl<'a, H: EditorHost + ?Sized> Deref for OpenFrames<'_, 'a, H> {
    type Target = CommandExecutor<'a, H>;
    fn deref(&self) -> &Self::Target {
        &*self.exec
    }
}

impl<H: EditorHost + ?Sized> DerefMut for OpenFrames<'_, '_, H> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.exec
    }
}

impl<H: EditorHost + ?Sized> Drop for OpenFrames<'_, '_, H> {
    fn drop(&mut self) {
        if self.open.is_empty() && !self.replaying {
            return;
        }
        warn!(target: "actions.dispatch", open = self.open.len(), "frames_dropped_open");
        let _ = self.close_all();
    }
}
