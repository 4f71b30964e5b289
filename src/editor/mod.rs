//! Form editors: record drafts and the auth forms.

pub mod auth_forms;
pub mod draft;
pub mod forms;

pub use auth_forms::{LoginForm, RegisterForm};
pub use draft::{Editor, Mode};
pub use forms::Draft;
