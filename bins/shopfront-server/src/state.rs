//! Shared handler state

use shopfront_api_client::ProductsApi;

/// State injected into every handler
#[derive(Clone)]
pub struct AppState {
    /// Products facade over the CMS client
    pub products: ProductsApi,
    /// Base URL for resolving relative image references, if configured
    pub asset_base: Option<String>,
}

impl AppState {
    /// Bundle the products facade with an optional asset base URL
    pub fn new(products: ProductsApi, asset_base: Option<String>) -> Self {
        Self {
            products,
            asset_base,
        }
    }
}
