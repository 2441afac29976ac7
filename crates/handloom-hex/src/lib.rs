//! handloom-hex: marketplace session core (cart, checkout, notifications)
//! with a local HTTP adapter for the storefront

pub mod config;
pub mod errors;

pub mod application;

pub use handloom_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
