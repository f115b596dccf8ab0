// Re-export model types, the session store, and HTTP handlers
pub mod http;
pub mod model;
pub mod store;

pub use model::{Draft, DraftKind, FilePayload, IngestReport};
pub use store::DraftStore;
