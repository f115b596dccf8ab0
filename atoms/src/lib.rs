//! Domain atoms for the shopfront backend. Each module owns one entity or
//! concern and takes AWS clients as arguments instead of holding global
//! state, so everything here stays callable from any lambda or block.

pub mod categories;
pub mod drafts;
pub mod gallery;
pub mod imaging;
pub mod media;
pub mod posts;
pub mod products;
