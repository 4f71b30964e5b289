//! Confirmation dialogs for destructive actions (delete, logout).

#[cfg(test)]
#[path = "confirm_test.rs"]
mod confirm_test;

use std::io::{BufRead, Write};

/// Visual treatment of a dialog. Both styles behave identically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DialogStyle {
    #[default]
    Standard,
    Danger,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Confirm,
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub style: DialogStyle,
}

impl ConfirmDialog {
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self { title: title.into(), message: message.into(), style: DialogStyle::Standard }
    }

    #[must_use]
    pub fn with_style(mut self, style: DialogStyle) -> Self {
        self.style = style;
        self
    }

    /// Dialog shown before deleting one record of kind `noun`.
    #[must_use]
    pub fn delete(noun: &str) -> Self {
        Self::new(format!("Delete {}", capitalize(noun)), format!("Are you sure you want to delete this {noun}?"))
            .with_style(DialogStyle::Danger)
    }

    #[must_use]
    pub fn logout() -> Self {
        Self::new("Logout", "Are you sure you want to log out?")
    }

    /// Show the dialog and run exactly one of the two callbacks.
    pub fn present<T>(
        &self,
        confirmer: &mut dyn Confirmer,
        on_confirm: impl FnOnce() -> T,
        on_cancel: impl FnOnce() -> T,
    ) -> T {
        match confirmer.decide(self) {
            Decision::Confirm => on_confirm(),
            Decision::Cancel => on_cancel(),
        }
    }
}

/// Something that can put a [`ConfirmDialog`] in front of the user.
pub trait Confirmer: Send {
    fn decide(&mut self, dialog: &ConfirmDialog) -> Decision;
}

/// Answers every dialog the same way (`--yes`, tests).
#[derive(Clone, Copy, Debug)]
pub struct AutoConfirm(pub Decision);

impl Confirmer for AutoConfirm {
    fn decide(&mut self, _dialog: &ConfirmDialog) -> Decision {
        self.0
    }
}

/// Prompts on a terminal and reads a `y`/`yes` answer. Anything else,
/// including end of input, cancels.
pub struct TerminalConfirmer<I, O> {
    input: I,
    output: O,
}

impl<I: BufRead + Send, O: Write + Send> TerminalConfirmer<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }
}

impl<I: BufRead + Send, O: Write + Send> Confirmer for TerminalConfirmer<I, O> {
    fn decide(&mut self, dialog: &ConfirmDialog) -> Decision {
        let marker = match dialog.style {
            DialogStyle::Standard => "",
            DialogStyle::Danger => "!! ",
        };
        if write!(self.output, "{marker}{}\n{} [y/N] ", dialog.title, dialog.message)
            .and_then(|()| self.output.flush())
            .is_err()
        {
            return Decision::Cancel;
        }

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) if is_yes(&answer) => Decision::Confirm,
            _ => Decision::Cancel,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// `student` -> `Student`.
#[must_use]
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}
