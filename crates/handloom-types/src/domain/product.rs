use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::domain::money::{parse_price_text, positive_number, Money, PriceChain, PriceValue};

/// Opaque product identifier. Catalog data uses numbers, but any string is
/// accepted; both forms compare equal by their text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawProductId")]
pub struct ProductId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawProductId {
    Number(u64),
    Text(String),
}

impl From<RawProductId> for ProductId {
    fn from(raw: RawProductId) -> Self {
        match raw {
            RawProductId::Number(n) => ProductId(n.to_string()),
            RawProductId::Text(s) => ProductId(s),
        }
    }
}

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for ProductId {
    fn from(n: u64) -> Self {
        ProductId(n.to_string())
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        ProductId(s.to_string())
    }
}

impl FromStr for ProductId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ProductId(s.to_string()))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog entry. Only `id`, the price fields, `name` and `image` matter to
/// the cart; the rest is carried for display and catalog filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_num: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_text: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub weave: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "in_stock_default")]
    pub in_stock: bool,
}

fn in_stock_default() -> bool {
    true
}

static CATALOG_PRICE: LazyLock<PriceChain<Product>> = LazyLock::new(|| {
    PriceChain::<Product>::new()
        .then("priceNum", |p| p.price_num.and_then(positive_number))
        .then("price:number", |p| match &p.price {
            Some(PriceValue::Number(n)) => positive_number(*n),
            _ => None,
        })
        .then("price:text", |p| match &p.price {
            Some(PriceValue::Text(text)) => Some(parse_price_text(text)),
            _ => None,
        })
        .then("priceText", |p| p.price_text.as_deref().map(parse_price_text))
});

impl Product {
    /// Canonical unit price, numeric fields first.
    pub fn unit_price(&self) -> Money {
        CATALOG_PRICE.resolve(self)
    }

    /// Display text kept on cart lines for receipts.
    pub fn display_price(&self) -> String {
        match (&self.price, &self.price_text) {
            (Some(PriceValue::Text(text)), _) if !text.is_empty() => text.clone(),
            (_, Some(text)) if !text.is_empty() => text.clone(),
            _ => self.unit_price().to_string(),
        }
    }
}
