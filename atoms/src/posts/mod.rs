// Re-export model types, content helpers and service functions
pub mod content;
pub mod http;
pub mod model;
pub mod service;

pub use content::{insert_image_reference, parse_content, ContentNode};
pub use model::{Post, PostInput, UpdatePostPayload};
pub use service::*;
