use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartLineItem};
use crate::domain::money::Money;
use crate::domain::validation::{
    card_digits, char_len, is_valid_email, is_valid_upi_handle, Field, ValidationError,
};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Billing {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Card form input. Never stored, and `Debug` hides the number and CVV.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardDetails {
    pub number: String,
    pub name: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub cvv: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last4 = card_digits(&self.number)
            .filter(|d| d.len() >= 4)
            .map(|d| d[d.len() - 4..].to_string());
        f.debug_struct("CardDetails")
            .field("last4", &last4)
            .field("name", &self.name)
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentSelection {
    Card(CardDetails),
    Upi {
        #[serde(default, rename = "upiId")]
        upi_id: String,
    },
}

impl PaymentSelection {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentSelection::Card(_) => PaymentMethod::Card,
            PaymentSelection::Upi { .. } => PaymentMethod::Upi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Card,
    #[serde(rename = "UPI")]
    Upi,
}

/// What an order keeps about the payment: never the full card number or CVV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum PaymentRecord {
    Card {
        #[serde(rename = "cardLast4")]
        card_last4: String,
    },
    #[serde(rename = "UPI")]
    Upi {
        #[serde(rename = "upiId")]
        upi_id: String,
    },
}

impl PaymentRecord {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentRecord::Card { .. } => PaymentMethod::Card,
            PaymentRecord::Upi { .. } => PaymentMethod::Upi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub date: DateTime<Utc>,
    pub items: Vec<CartLineItem>,
    pub total_items: u64,
    pub total_amount: Money,
    pub payment: PaymentRecord,
    pub billing: Billing,
    pub status: OrderStatus,
}

/// Body of a checkout submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub billing: Billing,
    pub payment: PaymentSelection,
}

/// `Idle -> Validating -> {Idle | Processing -> Completed}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutPhase {
    #[default]
    Idle,
    Validating,
    Processing,
    Completed,
}

impl CheckoutPhase {
    /// A new checkout may start only when none is in flight.
    pub fn accepts_submission(self) -> bool {
        matches!(self, CheckoutPhase::Idle | CheckoutPhase::Completed)
    }
}

/// `ORD-<epoch millis>-<9 random chars>`.
pub fn generate_order_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ORD-{}-{}", now.timestamp_millis(), &suffix[..9])
}

pub struct OrderBuilder;

impl OrderBuilder {
    /// Checks every checkout precondition and reports all failures at once.
    pub fn validate(
        cart: &Cart,
        billing: &Billing,
        payment: &PaymentSelection,
    ) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();

        if cart.is_empty() {
            err.push(Field::Cart, "Your cart is empty.");
        } else if cart.total_amount().is_zero() {
            err.push(
                Field::CartTotal,
                "Invalid cart total. Please refresh and try again.",
            );
        }

        match payment {
            PaymentSelection::Card(card) => validate_card(card, &mut err),
            PaymentSelection::Upi { upi_id } => {
                if !is_valid_upi_handle(upi_id) {
                    err.push(
                        Field::UpiId,
                        "Please enter a valid UPI ID (e.g., username@paytm, username@ybl)",
                    );
                }
            }
        }

        validate_billing(billing, &mut err);
        err.into_result()
    }

    pub fn build(
        cart: &Cart,
        billing: &Billing,
        payment: &PaymentSelection,
    ) -> Result<Order, ValidationError> {
        Self::build_at(cart, billing, payment, Utc::now())
    }

    pub fn build_at(
        cart: &Cart,
        billing: &Billing,
        payment: &PaymentSelection,
        now: DateTime<Utc>,
    ) -> Result<Order, ValidationError> {
        Self::validate(cart, billing, payment)?;
        let totals = cart.totals();
        Ok(Order {
            id: generate_order_id(now),
            date: now,
            items: cart.lines().to_vec(),
            total_items: totals.total_items,
            total_amount: totals.total_amount,
            payment: redact(payment),
            billing: billing.clone(),
            status: OrderStatus::Completed,
        })
    }
}

fn redact(payment: &PaymentSelection) -> PaymentRecord {
    match payment {
        PaymentSelection::Card(card) => {
            let digits = card_digits(&card.number).unwrap_or_default();
            let start = digits.len().saturating_sub(4);
            PaymentRecord::Card {
                card_last4: digits[start..].to_string(),
            }
        }
        PaymentSelection::Upi { upi_id } => PaymentRecord::Upi {
            upi_id: upi_id.clone(),
        },
    }
}

fn validate_card(card: &CardDetails, err: &mut ValidationError) {
    let digits_ok = card_digits(&card.number).is_some_and(|d| d.len() == 16);
    if !digits_ok {
        err.push(
            Field::CardNumber,
            "Please enter a valid 16-digit card number",
        );
    }
    if char_len(card.name.trim()) < 3 {
        err.push(Field::CardName, "Please enter cardholder name");
    }
    if card.expiry_month.trim().is_empty() || card.expiry_year.trim().is_empty() {
        err.push(Field::ExpiryMonth, "Please select expiry date");
    }
    if char_len(card.cvv.trim()) < 3 {
        err.push(Field::Cvv, "Please enter a valid CVV");
    }
}

fn validate_billing(billing: &Billing, err: &mut ValidationError) {
    if char_len(billing.name.trim()) < 2 {
        err.push(Field::BillingName, "Please enter your name");
    }
    if !is_valid_email(&billing.email) {
        err.push(Field::BillingEmail, "Please enter a valid email");
    }
    if char_len(billing.phone.trim()) < 10 {
        err.push(Field::BillingPhone, "Please enter a valid phone number");
    }
    if char_len(billing.address.trim()) < 5 {
        err.push(Field::BillingAddress, "Please enter your address");
    }
    if billing.city.trim().is_empty() {
        err.push(Field::BillingCity, "Please enter your city");
    }
    if billing.state.trim().is_empty() {
        err.push(Field::BillingState, "Please enter your state");
    }
    if char_len(billing.zip.trim()) < 5 {
        err.push(Field::BillingZip, "Please enter a valid zip code");
    }
}
