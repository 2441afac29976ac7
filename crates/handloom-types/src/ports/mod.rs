pub mod cart_repository;
pub mod kv_store;
pub mod order_log;
