pub mod category;
pub mod inventory;
pub mod order;
pub mod order_item;
pub mod product;
pub mod store;
