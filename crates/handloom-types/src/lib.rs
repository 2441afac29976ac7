//! handloom-types: marketplace domain (pricing, cart, orders) and storage ports

pub mod domain;
pub mod ports;
