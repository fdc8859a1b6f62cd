//! Product and medicine browsing by category.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use crate::error::ClientError;
use crate::net::api::ApiClient;
use crate::net::types::Product;

pub struct CatalogService {
    api: ApiClient,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns whatever the products endpoint fails with.
    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        self.api.products().await
    }

    /// # Errors
    ///
    /// Returns whatever the medicines endpoint fails with.
    pub async fn medicines(&self) -> Result<Vec<Product>, ClientError> {
        self.api.medicines().await
    }

    /// Look a product up by id across both listings.
    ///
    /// # Errors
    ///
    /// Returns whatever either endpoint fails with.
    pub async fn find(&self, id: &str) -> Result<Option<Product>, ClientError> {
        if let Some(found) = self.products().await?.into_iter().find(|p| p.id == id) {
            return Ok(Some(found));
        }
        Ok(self.medicines().await?.into_iter().find(|p| p.id == id))
    }
}

/// Distinct non-empty categories in first-seen order, compared case-insensitively.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        let name = product.category.trim();
        if !name.is_empty() && !seen.iter().any(|c| c.eq_ignore_ascii_case(name)) {
            seen.push(name.to_owned());
        }
    }
    seen
}

/// Products whose category equals `category`, ignoring case.
#[must_use]
pub fn by_category<'a>(products: &'a [Product], category: &str) -> Vec<&'a Product> {
    let wanted = category.trim();
    products
        .iter()
        .filter(|p| p.category.trim().eq_ignore_ascii_case(wanted))
        .collect()
}

/// Case-insensitive substring search over name and description.
#[must_use]
pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }
    products
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.description.as_deref().is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}
