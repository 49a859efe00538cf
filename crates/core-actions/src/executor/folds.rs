//! Fold commands. Folds live with the host; a buffer without a fold manager
//! ignores them.

use core_state::{FoldManager, ModeKind};
use core_text::LineRange;
use tracing::{debug, trace};

use super::{CommandExecutor, focused_view};
use crate::command::{CommandData, ModeSwitch};
use crate::error::CommandError;
use crate::host::EditorHost;
use crate::motion::Motion;
use crate::visual::VisualSpan;

impl<H: EditorHost + ?Sized> CommandExecutor<'_, H> {
    fn with_folds(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut dyn FoldManager),
    ) -> Result<ModeSwitch, CommandError> {
        let id = self.focused();
        match self.host.fold_manager(id) {
            Some(folds) => {
                f(folds);
                trace!(target: "actions.dispatch", op, buffer = id.0, "fold");
            }
            None => debug!(target: "actions.dispatch", op, buffer = id.0, "no_fold_manager"),
        }
        Ok(ModeSwitch::NoSwitch)
    }

    fn caret_line(&mut self) -> Result<usize, CommandError> {
        Ok(focused_view(self.host)?.caret().line)
    }

    pub(crate) fn fold_lines(&mut self, data: CommandData) -> Result<ModeSwitch, CommandError> {
        let view = focused_view(self.host)?;
        let range = view
            .snapshot()
            .line_range(view.caret().line, data.count_or_default());
        self.with_folds("create", |folds| folds.create_fold(range))
    }

    pub(crate) fn fold_motion(
        &mut self,
        motion: Motion,
        data: CommandData,
    ) -> Result<ModeSwitch, CommandError> {
        let range = self.resolve_motion(motion, data.count, true)?.line_range;
        self.with_folds("create", |folds| folds.create_fold(range))
    }

    pub(crate) fn open_fold_under_caret(&mut self, data: CommandData) -> Result<ModeSwitch, CommandError> {
        let line = self.caret_line()?;
        let count = data.count_or_default();
        self.with_folds("open", |folds| folds.open_fold(line, count))
    }

    pub(crate) fn close_fold_under_caret(&mut self, data: CommandData) -> Result<ModeSwitch, CommandError> {
        let line = self.caret_line()?;
        let count = data.count_or_default();
        self.with_folds("close", |folds| folds.close_fold(line, count))
    }

    pub(crate) fn open_all_folds_under_caret(&mut self) -> Result<ModeSwitch, CommandError> {
        let line = self.caret_line()?;
        self.with_folds("open_all", |folds| folds.open_all_folds(LineRange::new(line, 1)))
    }

    pub(crate) fn close_all_folds_under_caret(&mut self) -> Result<ModeSwitch, CommandError> {
        let line = self.caret_line()?;
        self.with_folds("close_all", |folds| folds.close_all_folds(LineRange::new(line, 1)))
    }

    pub(crate) fn delete_fold_under_caret(&mut self) -> Result<ModeSwitch, CommandError> {
        let line = self.caret_line()?;
        self.with_folds("delete", |folds| folds.delete_fold(line))
    }

    pub(crate) fn delete_all_folds_under_caret(&mut self) -> Result<ModeSwitch, CommandError> {
        let line = self.caret_line()?;
        self.with_folds("delete_all", |folds| folds.delete_all_folds(LineRange::new(line, 1)))
    }

    pub(crate) fn delete_all_folds_in_buffer(&mut self) -> Result<ModeSwitch, CommandError> {
        let lines = focused_view(self.host)?.snapshot().line_count();
        self.with_folds("delete_all", |folds| folds.delete_all_folds(LineRange::new(0, lines)))
    }

    pub(crate) fn fold_selection(&mut self, span: &VisualSpan) -> Result<ModeSwitch, CommandError> {
        let range = span.line_range(&focused_view(self.host)?.snapshot());
        self.with_folds("create", |folds| folds.create_fold(range))?;
        Ok(ModeSwitch::SwitchMode(ModeKind::Normal))
    }

    pub(crate) fn delete_all_folds_in_selection(
        &mut self,
        span: &VisualSpan,
    ) -> Result<ModeSwitch, CommandError> {
        let range = span.line_range(&focused_view(self.host)?.snapshot());
        self.with_folds("delete_all", |folds| folds.delete_all_folds(range))?;
        Ok(ModeSwitch::SwitchMode(ModeKind::Normal))
    }
}
