use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::domain::money::{parse_price_text, positive_number, Money, PriceChain, PriceValue};
use crate::domain::product::{Product, ProductId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub price: Money,
    pub price_text: String,
    pub quantity: u32,
}

impl CartLineItem {
    pub fn line_total(&self) -> Money {
        self.price.times(u64::from(self.quantity))
    }
}

/// `max(1, floor(q))`. NaN counts as 1.
pub fn clamp_quantity(quantity: f64) -> u32 {
    if quantity.is_nan() || quantity < 1.0 {
        return 1;
    }
    quantity.floor() as u32
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub total_items: u64,
    pub total_amount: Money,
}

/// Cart as shown to the storefront: lines plus freshly computed totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub total_items: u64,
    pub total_amount: Money,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        Self {
            items: cart.lines.clone(),
            total_items: totals.total_items,
            total_amount: totals.total_amount,
        }
    }
}

/// Insertion-ordered cart lines, unique by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.lines.iter().find(|l| &l.id == id)
    }

    /// Adds one unit. An existing line takes the product's current price.
    pub fn add_or_increment(&mut self, product: &Product) -> &CartLineItem {
        let price = product.unit_price();
        let price_text = product.display_price();
        let idx = match self.lines.iter().position(|l| l.id == product.id) {
            Some(idx) => {
                let line = &mut self.lines[idx];
                line.quantity = line.quantity.saturating_add(1);
                line.price = price;
                line.price_text = price_text;
                idx
            }
            None => {
                self.lines.push(CartLineItem {
                    id: product.id.clone(),
                    name: product.name.clone(),
                    image: product.image.clone(),
                    price,
                    price_text,
                    quantity: 1,
                });
                self.lines.len() - 1
            }
        };
        &self.lines[idx]
    }

    /// Returns `false` when no line has this id.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: f64) -> bool {
        match self.lines.iter_mut().find(|l| &l.id == id) {
            Some(line) => {
                line.quantity = clamp_quantity(quantity);
                true
            }
            None => false,
        }
    }

    /// Returns whether a line was removed. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.id != id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn total_amount(&self) -> Money {
        self.lines.iter().map(CartLineItem::line_total).sum()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total_items: self.total_items(),
            total_amount: self.total_amount(),
        }
    }

    /// Reads a persisted snapshot, repairing every line on the way in.
    pub fn from_snapshot(json: &str) -> Result<Self, serde_json::Error> {
        let stored: Vec<StoredLine> = serde_json::from_str(json)?;
        Ok(migrate(stored))
    }

    pub fn to_snapshot(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A cart line as found in storage, possibly written by an older build or
/// hand-edited: prices may be strings, quantities may be missing or bogus.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLine {
    pub id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price: Option<PriceValue>,
    #[serde(default)]
    pub price_num: Option<f64>,
    #[serde(default)]
    pub price_text: Option<String>,
    #[serde(default)]
    pub quantity: Option<serde_json::Value>,
}

static STORED_PRICE: LazyLock<PriceChain<StoredLine>> = LazyLock::new(|| {
    PriceChain::<StoredLine>::new()
        .then("price:number", |l| match &l.price {
            Some(PriceValue::Number(n)) => positive_number(*n),
            _ => None,
        })
        .then("priceNum", |l| l.price_num.and_then(positive_number))
        .then("priceText", |l| l.price_text.as_deref().map(parse_price_text))
        .then("price:text", |l| match &l.price {
            Some(PriceValue::Text(text)) => Some(parse_price_text(text)),
            _ => None,
        })
});

impl StoredLine {
    // Numbers or numeric strings; anything else counts as 1.
    fn quantity(&self) -> u32 {
        let raw = match self.quantity.as_ref() {
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match raw {
            Some(q) if q.is_finite() && q > 0.0 => clamp_quantity(q),
            _ => 1,
        }
    }

    fn into_line(self) -> CartLineItem {
        let price = STORED_PRICE.resolve(&self);
        let quantity = self.quantity();
        let price_text = self
            .price_text
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| price.to_string());
        CartLineItem {
            id: self.id,
            name: self.name.unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            price,
            price_text,
            quantity,
        }
    }
}

/// Normalizes stored lines into a cart. Idempotent: migrating an already
/// canonical snapshot yields the same cart. Later duplicates of an id are
/// dropped.
pub fn migrate(stored: Vec<StoredLine>) -> Cart {
    let mut cart = Cart::new();
    for line in stored {
        if cart.get(&line.id).is_some() {
            tracing::warn!(product_id = %line.id, "dropping duplicate stored cart line");
            continue;
        }
        cart.lines.push(line.into_line());
    }
    cart
}
