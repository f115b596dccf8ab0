// Storefront page compositions built on the catalog atoms
pub mod browse;
pub mod detail;
pub mod types;
