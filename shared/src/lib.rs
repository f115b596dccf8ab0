//! Shared application state, auth, and contact plumbing for the API lambda.

pub mod auth;
pub mod contact;
pub mod email;
pub mod state;

pub use state::AppState;
