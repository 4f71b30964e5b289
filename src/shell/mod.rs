//! View shell: section routing, dialogs, notifications, terminal rendering.

pub mod confirm;
pub mod notify;
pub mod render;
pub mod view;

pub use confirm::{AutoConfirm, ConfirmDialog, Confirmer, Decision, DialogStyle, TerminalConfirmer};
pub use notify::{Notifier, TerminalNotifier};
pub use view::{AuthMode, Screen, Section, SectionRecord, Shell, View};
