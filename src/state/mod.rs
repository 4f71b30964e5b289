//! Cached entity collections and the views derived from them.

pub mod collection;
pub mod controller;
pub mod filter;
pub mod lookup;
pub mod roster;

pub use collection::{Collection, Phase, Reconciled};
pub use controller::{DeleteOutcome, ListController};
