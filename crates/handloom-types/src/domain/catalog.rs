use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};

const SAMPLE_CATALOG: &str = include_str!("../../fixtures/catalog.json");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Default,
    PriceLow,
    PriceHigh,
    Name,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    /// `None` or `"All"` means every category.
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: SortOrder,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// The bundled handloom sample catalog.
    pub fn sample() -> Result<Self, serde_json::Error> {
        Self::from_json(SAMPLE_CATALOG)
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Distinct categories in catalog order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for p in &self.products {
            if !seen.iter().any(|c| c == &p.category) {
                seen.push(p.category.clone());
            }
        }
        seen
    }

    pub fn list(&self, query: &CatalogQuery) -> Vec<Product> {
        let category = query
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != "All");
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut out: Vec<Product> = self
            .products
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .filter(|p| match &needle {
                Some(n) => [&p.name, &p.region, &p.weave, &p.description]
                    .iter()
                    .any(|field| field.to_lowercase().contains(n.as_str())),
                None => true,
            })
            .cloned()
            .collect();

        match query.sort {
            SortOrder::Default => {}
            SortOrder::PriceLow => out.sort_by_key(|p| p.unit_price()),
            SortOrder::PriceHigh => out.sort_by_key(|p| std::cmp::Reverse(p.unit_price())),
            SortOrder::Name => out.sort_by_key(|p| p.name.to_lowercase()),
        }
        out
    }
}
