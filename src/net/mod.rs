//! HTTP access to the school-management API.

pub mod api;
pub mod resource;
pub mod types;

pub use api::ApiClient;
pub use resource::Resource;
