use anyhow::Context;
use handloom_types::domain::order::PaymentMethod;
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: String,
    pub database_url: Option<String>,
    pub card_payment_delay_ms: u64,
    pub upi_payment_delay_ms: u64,
    pub toast_duration_ms: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let millis = |key: &str, default: u64| -> anyhow::Result<u64> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{key} must be a whole number of milliseconds")),
                None => Ok(default),
            }
        };
        Ok(Self {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            server_port: lookup("SERVER_PORT").unwrap_or_else(|| "3000".into()),
            database_url: lookup("DATABASE_URL"),
            card_payment_delay_ms: millis("CARD_PAYMENT_DELAY_MS", 2000)?,
            upi_payment_delay_ms: millis("UPI_PAYMENT_DELAY_MS", 1500)?,
            toast_duration_ms: millis("TOAST_DURATION_MS", 3000)?,
        })
    }

    pub fn payment_delays(&self) -> PaymentDelays {
        PaymentDelays {
            card: Duration::from_millis(self.card_payment_delay_ms),
            upi: Duration::from_millis(self.upi_payment_delay_ms),
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

/// Simulated gateway latency per payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentDelays {
    pub card: Duration,
    pub upi: Duration,
}

impl PaymentDelays {
    pub fn none() -> Self {
        Self {
            card: Duration::ZERO,
            upi: Duration::ZERO,
        }
    }

    pub fn for_method(&self, method: PaymentMethod) -> Duration {
        match method {
            PaymentMethod::Card => self.card,
            PaymentMethod::Upi => self.upi,
        }
    }
}

impl Default for PaymentDelays {
    fn default() -> Self {
        Self {
            card: Duration::from_millis(2000),
            upi: Duration::from_millis(1500),
        }
    }
}
