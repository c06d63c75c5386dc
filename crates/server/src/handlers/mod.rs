//! HTTP request handlers.

pub mod admin;
pub mod auth;
pub mod common;
pub mod dashboard;
pub mod downloads;
pub mod uploads;

pub use admin::*;
pub use auth::*;
pub use dashboard::*;
pub use downloads::*;
pub use uploads::*;
