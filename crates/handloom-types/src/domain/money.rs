use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// Whole-rupee amount. Never negative, never fractional.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub const fn amount(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Rounds half up. NaN and negative inputs collapse to zero.
    pub fn from_rounded(value: f64) -> Self {
        if value.is_nan() || value <= 0.0 {
            return Self::ZERO;
        }
        Self(value.round() as u64)
    }

    pub fn times(self, quantity: u64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }

    pub fn plus(self, other: Money) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl From<u64> for Money {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::plus)
    }
}

/// Formats as `Rs.1,08,500` (Indian digit grouping).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.to_string();
        if digits.len() <= 3 {
            return write!(f, "Rs.{digits}");
        }
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups = Vec::new();
        let mut end = head.len();
        while end > 0 {
            let start = end.saturating_sub(2);
            groups.push(&head[start..end]);
            end = start;
        }
        groups.reverse();
        write!(f, "Rs.{},{}", groups.join(","), tail)
    }
}

/// A price as it shows up in product data: either a number or display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(f64),
    Text(String),
}

impl From<f64> for PriceValue {
    fn from(n: f64) -> Self {
        PriceValue::Number(n)
    }
}

impl From<&str> for PriceValue {
    fn from(s: &str) -> Self {
        PriceValue::Text(s.to_string())
    }
}

/// Canonical price for any input. Unparseable input is free (zero), never an error.
pub fn normalize(input: Option<&PriceValue>) -> Money {
    match input {
        Some(PriceValue::Number(n)) => positive_number(*n).unwrap_or(Money::ZERO),
        Some(PriceValue::Text(text)) => parse_price_text(text),
        None => Money::ZERO,
    }
}

/// `Some` only for finite numbers above zero.
pub fn positive_number(n: f64) -> Option<Money> {
    if n.is_finite() && n > 0.0 {
        Some(Money::from_rounded(n))
    } else {
        None
    }
}

/// Parses display text such as `"Rs.1,085"` or `"₹ 2,499.50"`.
///
/// Everything except digits, `.` and `,` is dropped and the thousands
/// separators are removed before the leading decimal is read. A dot that
/// belongs to a currency prefix (`Rs.`) is dropped along with the prefix.
pub fn parse_price_text(text: &str) -> Money {
    let text = text.trim();
    let mut cleaned = String::with_capacity(text.len());
    let mut seen_digit = false;
    let mut seen_prefix = false;
    for ch in text.chars() {
        match ch {
            '0'..='9' => {
                seen_digit = true;
                cleaned.push(ch);
            }
            '.' if !seen_digit && seen_prefix => {}
            '.' => cleaned.push(ch),
            ',' => {}
            _ => seen_prefix = true,
        }
    }

    match leading_decimal(&cleaned) {
        Some(value) if value.is_finite() && value >= 0.0 => Money::from_rounded(value),
        _ => {
            tracing::debug!(input = %text, "unparseable price, treating as zero");
            Money::ZERO
        }
    }
}

// Longest `digits[.digits]` prefix, as a float.
fn leading_decimal(s: &str) -> Option<f64> {
    let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
    let frac_len = s[int_len..]
        .strip_prefix('.')
        .map(|frac| frac.bytes().take_while(u8::is_ascii_digit).count())
        .unwrap_or(0);
    if int_len == 0 && frac_len == 0 {
        return None;
    }
    let end = if frac_len > 0 {
        int_len + 1 + frac_len
    } else {
        int_len
    };
    s[..end].parse::<f64>().ok()
}

pub type PriceStrategy<T> = fn(&T) -> Option<Money>;

/// Ordered list of price extraction strategies. The first strategy that
/// yields a non-zero price wins; if none does, the price is zero.
pub struct PriceChain<T> {
    steps: Vec<(&'static str, PriceStrategy<T>)>,
}

impl<T> PriceChain<T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn then(mut self, name: &'static str, strategy: PriceStrategy<T>) -> Self {
        self.steps.push((name, strategy));
        self
    }

    pub fn resolve(&self, source: &T) -> Money {
        for (name, strategy) in &self.steps {
            if let Some(price) = strategy(source).filter(|p| !p.is_zero()) {
                tracing::trace!(strategy = name, price = price.amount(), "price resolved");
                return price;
            }
        }
        Money::ZERO
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|(name, _)| *name).collect()
    }
}

impl<T> Default for PriceChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PriceChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceChain")
            .field("steps", &self.strategy_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_round_to_nearest() {
        assert_eq!(normalize(Some(&PriceValue::Number(1085.0))), Money::new(1085));
        assert_eq!(normalize(Some(&PriceValue::Number(99.5))), Money::new(100));
        assert_eq!(normalize(Some(&PriceValue::Number(99.49))), Money::new(99));
    }

    #[test]
    fn bad_inputs_are_zero() {
        assert_eq!(normalize(None), Money::ZERO);
        assert_eq!(normalize(Some(&"".into())), Money::ZERO);
        assert_eq!(normalize(Some(&"abc".into())), Money::ZERO);
        assert_eq!(normalize(Some(&PriceValue::Number(-40.0))), Money::ZERO);
        assert_eq!(normalize(Some(&PriceValue::Number(0.0))), Money::ZERO);
        assert_eq!(normalize(Some(&PriceValue::Number(f64::NAN))), Money::ZERO);
        assert_eq!(
            normalize(Some(&PriceValue::Number(f64::INFINITY))),
            Money::ZERO
        );
    }

    #[test]
    fn currency_text_with_separators() {
        assert_eq!(parse_price_text("Rs.1,085"), Money::new(1085));
        assert_eq!(parse_price_text("Rs.1085"), Money::new(1085));
        assert_eq!(parse_price_text("Rs. 2,499.50"), Money::new(2500));
        assert_eq!(parse_price_text("₹1,08,500"), Money::new(108500));
        assert_eq!(parse_price_text("1,085"), Money::new(1085));
        assert_eq!(parse_price_text("12.5.7"), Money::new(13));
        assert_eq!(parse_price_text(".5"), Money::new(1));
        assert_eq!(parse_price_text("Rs."), Money::ZERO);
    }

    #[test]
    fn huge_digit_strings_are_zero() {
        let digits = "9".repeat(400);
        assert_eq!(parse_price_text(&digits), Money::ZERO);
    }

    #[test]
    fn display_uses_indian_grouping() {
        assert_eq!(Money::new(0).to_string(), "Rs.0");
        assert_eq!(Money::new(879).to_string(), "Rs.879");
        assert_eq!(Money::new(1085).to_string(), "Rs.1,085");
        assert_eq!(Money::new(108500).to_string(), "Rs.1,08,500");
        assert_eq!(Money::new(12345678).to_string(), "Rs.1,23,45,678");
    }

    #[test]
    fn chain_takes_first_non_zero() {
        struct Src {
            a: f64,
            b: &'static str,
        }
        let chain = PriceChain::<Src>::new()
            .then("a", |s| positive_number(s.a))
            .then("b", |s| Some(parse_price_text(s.b)));

        assert_eq!(chain.resolve(&Src { a: 10.0, b: "20" }), Money::new(10));
        assert_eq!(chain.resolve(&Src { a: 0.0, b: "20" }), Money::new(20));
        assert_eq!(chain.resolve(&Src { a: -1.0, b: "x" }), Money::ZERO);
        assert_eq!(chain.strategy_names(), vec!["a", "b"]);
    }
}
