pub mod cart;
pub mod catalog;
pub mod money;
pub mod notification;
pub mod order;
pub mod product;
pub mod validation;
