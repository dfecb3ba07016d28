pub mod category;
pub mod inventory;
pub mod order;
pub mod product;
pub mod store;
