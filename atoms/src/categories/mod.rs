// Re-export model types and service functions
pub mod http;
pub mod model;
pub mod service;

pub use model::{Category, CreateCategoryPayload, UpdateCategoryPayload, DEFAULT_CATEGORY_ID};
pub use service::*;
