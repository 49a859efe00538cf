//! Command-execution core of the modal editing engine.
//!
//! Upstream decoding turns keystrokes into a [`Command`]; this crate carries
//! it out against the focused buffer:
//! * `executor` - one handler per Normal / Visual command, each wrapping its
//!   mutation and final caret move in a single undo scope.
//! * `repeat`   - `.` replays the session's last change, including linked
//!   change + typed-text pairs, as one undo unit.
//! * `macros`   - `q` / `@` record keys into registers and replay them
//!   through the host's live key pipeline.
//! * `visual`   - concrete selections and the position-free shape kept for
//!   repeat.
//! * `insert`   - text entry between an insert-entering command and `<Esc>`.
//!
//! The editor around the core is reached only through [`EditorHost`]. All
//! session-wide state (registers, last change, macro recorder) lives in a
//! [`Session`] the caller owns and lends to the executor.

pub mod command;
pub mod error;
pub mod executor;
pub mod host;
pub mod insert;
pub mod macros;
pub mod motion;
pub mod repeat;
pub mod session;
pub mod visual;

pub use command::{
    ChangeCharacterKind, Command, CommandData, CommandFlags, CommandResult, JoinKind,
    ModeArgument, ModeSwitch, NormalCommand, VisualCommand,
};
pub use core_state::{FoldManager, ModeKind};
pub use error::CommandError;
pub use executor::CommandExecutor;
pub use host::{EditorHost, HostError, KeyOutcome, StatusReporter};
pub use insert::InsertSession;
pub use motion::{Motion, MotionContext, MotionFlags, MotionResolver, MotionResult, TextMotionResolver};
pub use session::{RepeatGuard, Session, StoredCommand, TextChange};
pub use visual::{BlockSpan, StoredVisualSpan, VisualSpan};
