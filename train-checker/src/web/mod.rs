//! HTTP layer for on-demand train checks.
//!
//! Every check endpoint runs a full cycle, so a successful request also
//! sends the status message.

mod routes;
mod state;

pub use routes::{AppError, create_router};
pub use state::AppState;
