//! HTTP server for the stockist submission portal.
//!
//! Regional managers sign in with a routing email, see the stockists routed
//! to them and upload AWS/SSS documents. Admins edit rows, export the table
//! and download the upload tree as zip archives, scoped by role and division.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pages;
pub mod routes;
pub mod session;
pub mod state;

pub use error::{PortalError, PortalResult};
pub use routes::create_router;
pub use session::{CurrentSession, Flash, FlashLevel, SessionStore};
pub use state::AppState;
