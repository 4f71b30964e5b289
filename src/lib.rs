//! Terminal client for a school-management REST API: session handling,
//! cached class/student/teacher collections, record editors and a view shell.

pub mod config;
pub mod editor;
pub mod error;
pub mod net;
pub mod session;
pub mod shell;
pub mod state;
