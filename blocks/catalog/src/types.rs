use serde::Serialize;

use shopfront_atoms::categories::Category;
use shopfront_atoms::products::Product;

// ========== HOME PAGE ==========
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CategorySection {
    pub category: Category,
    /// Products chunked three to a slide, ready for the carousel.
    pub slides: Vec<Vec<Product>>,
    pub slide_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub sections: Vec<CategorySection>,
}

// ========== BROWSE ==========
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub search: String,
    pub category: String,
    /// `min-max`, either side may be left open ("100-", "-500").
    pub price_range: String,
    pub sort: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowsePage {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub total: usize,
}

// ========== PRODUCT DETAIL ==========
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub product: Product,
    /// Primary image first, then the extras, empty entries dropped.
    pub gallery: Vec<String>,
}
