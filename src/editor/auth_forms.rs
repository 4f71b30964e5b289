//! Sign-in and sign-up form validation.
//!
//! Validation collects every problem at once, in field order, so the user
//! sees the whole list rather than fixing one field per submit.

#[cfg(test)]
#[path = "auth_forms_test.rs"]
mod auth_forms_test;

use std::sync::OnceLock;

use regex::Regex;

use crate::net::types::{RegisterRequest, Role};

pub const MIN_PASSWORD_LEN: usize = 6;

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").ok()).as_ref()
}

/// Loose shape check: something, `@`, something, `.`, something.
#[must_use]
pub fn is_plausible_email(email: &str) -> bool {
    email_pattern().is_some_and(|re| re.is_match(email))
}

fn check_email(email: &str, errors: &mut Vec<String>) {
    if email.trim().is_empty() {
        errors.push("Email is required.".to_owned());
    } else if !is_plausible_email(email) {
        errors.push("Email is invalid.".to_owned());
    }
}

fn check_password(password: &str, errors: &mut Vec<String>) {
    if password.is_empty() {
        errors.push("Password is required.".to_owned());
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!("Password must be at least {MIN_PASSWORD_LEN} characters."));
    }
}

fn into_result(errors: Vec<String>) -> Result<(), Vec<String>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// # Errors
    ///
    /// Returns every validation message, in field order.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);
        into_result(errors)
    }

    /// Email as sent to the server.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.trim()
    }
}

// =============================================================================
// REGISTER
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub retype_password: String,
    pub agree_terms: bool,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns every validation message, in field order.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name is required.".to_owned());
        }
        check_email(&self.email, &mut errors);
        check_password(&self.password, &mut errors);
        if self.retype_password.is_empty() {
            errors.push("Retype password is required.".to_owned());
        } else if self.password != self.retype_password {
            errors.push("Passwords do not match.".to_owned());
        }
        if !self.agree_terms {
            errors.push("You must agree to the terms.".to_owned());
        }
        into_result(errors)
    }

    /// Registration body. Self-registered accounts are always students.
    #[must_use]
    pub fn request(&self) -> RegisterRequest<'_> {
        RegisterRequest {
            name: self.name.trim(),
            email: self.email.trim(),
            password: &self.password,
            role: Role::Student,
        }
    }

    /// Credentials for the automatic sign-in after registering.
    #[must_use]
    pub fn login_form(&self) -> LoginForm {
        LoginForm::new(self.email.trim(), self.password.clone())
    }
}
